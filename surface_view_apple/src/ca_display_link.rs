// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `CADisplayLink` refresh driver.
//!
//! Callbacks run on the main thread's run loop, so the tick handler can be a
//! plain `Fn` and may touch main-thread-only objects directly.
//!
//! ```text
//! CADisplayLink (main run loop)
//!   → DisplayLinkTarget::tick:
//!     → callback(VsyncTick)
//!       → RenderSurfaceView::on_vsync → delegate.draw(frame)
//! ```

use alloc::boxed::Box;
use core::cell::Cell;
use core::convert::Infallible;
use core::fmt;

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{DefinedClass, MainThreadMarker, MainThreadOnly, define_class, msg_send, sel};
use objc2_foundation::{NSDefaultRunLoopMode, NSObject, NSObjectProtocol, NSRunLoop};
use objc2_quartz_core::CADisplayLink as CADisplayLinkRaw;
use surface_view_core::backend::RefreshDriver;
use surface_view_core::time::{HostTime, Timebase};
use surface_view_core::timing::{DisplayId, TimingConfidence, VsyncTick};

use crate::mach_time;

struct TargetIvars {
    callback: Box<dyn Fn(VsyncTick)>,
    display: DisplayId,
    timebase: Timebase,
    next_tick_index: Cell<u64>,
    /// Set on start; the first callback after it has no previous present.
    restarted: Cell<bool>,
}

define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "SurfaceViewDisplayLinkTarget"]
    #[ivars = TargetIvars]
    struct DisplayLinkTarget;

    unsafe impl NSObjectProtocol for DisplayLinkTarget {}

    impl DisplayLinkTarget {
        #[unsafe(method(tick:))]
        fn tick(&self, sender: &AnyObject) {
            let tick = self.read_tick(sender);
            (self.ivars().callback)(tick);
        }
    }
}

impl DisplayLinkTarget {
    fn new(
        callback: Box<dyn Fn(VsyncTick)>,
        display: DisplayId,
        mtm: MainThreadMarker,
    ) -> Retained<Self> {
        let this = mtm.alloc::<Self>().set_ivars(TargetIvars {
            callback,
            display,
            timebase: mach_time::timebase(),
            next_tick_index: Cell::new(0),
            restarted: Cell::new(true),
        });
        // SAFETY: NSObject's init has no preconditions.
        unsafe { msg_send![super(this), init] }
    }

    fn read_tick(&self, sender: &AnyObject) -> VsyncTick {
        let ivars = self.ivars();
        let tb = ivars.timebase;

        // SAFETY: `sender` is the CADisplayLink that invoked `tick:`; these
        // are read-only `CFTimeInterval` properties.
        let (target_ts, duration, timestamp): (f64, f64, f64) = unsafe {
            (
                msg_send![sender, targetTimestamp],
                msg_send![sender, duration],
                msg_send![sender, timestamp],
            )
        };

        let tick_index = ivars.next_tick_index.get();
        ivars.next_tick_index.set(tick_index + 1);

        // `timestamp` is when the previous frame reached the display. Right
        // after starting it describes a frame this link did not drive.
        let prev_actual_present = if ivars.restarted.replace(false) {
            None
        } else {
            Some(mach_time::host_time(timestamp, tb))
        };

        VsyncTick {
            now: mach_time::now(),
            target_present: Some(mach_time::host_time(target_ts, tb)),
            refresh_interval: Some(mach_time::duration(duration, tb)),
            confidence: TimingConfidence::Predictive,
            tick_index,
            display: ivars.display,
            prev_actual_present,
        }
    }
}

/// `CADisplayLink` wrapper that produces [`VsyncTick`]s on the main thread.
///
/// The link is created stopped; [`RefreshDriver::start`] schedules it on the
/// main run loop and [`RefreshDriver::stop`] unschedules it. Dropping the
/// link invalidates it.
///
/// Requires macOS 14+ or iOS 15+ (`targetTimestamp`).
///
/// # Example
///
/// ```ignore
/// let mut link = DisplayLink::new(|tick| view.on_vsync(&tick, &mut delegate), DisplayId(0), mtm);
/// link.start()?;
/// ```
pub struct DisplayLink {
    raw: Retained<CADisplayLinkRaw>,
    // CADisplayLink retains its target, but the ivars are read from here.
    target: Retained<DisplayLinkTarget>,
    scheduled: bool,
}

impl fmt::Debug for DisplayLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayLink")
            .field("display", &self.target.ivars().display)
            .field("scheduled", &self.scheduled)
            .finish_non_exhaustive()
    }
}

impl DisplayLink {
    /// Creates a stopped display link that calls `callback` on every refresh.
    pub fn new<F>(callback: F, display: DisplayId, mtm: MainThreadMarker) -> Self
    where
        F: Fn(VsyncTick) + 'static,
    {
        let target = DisplayLinkTarget::new(Box::new(callback), display, mtm);

        // SAFETY: `target` is a live NSObject implementing `tick:` with the
        // signature CADisplayLink expects, and stays alive for as long as the
        // link does.
        let raw = unsafe {
            CADisplayLinkRaw::displayLinkWithTarget_selector(
                &*((&*target) as *const DisplayLinkTarget as *const AnyObject),
                sel!(tick:),
            )
        };

        Self {
            raw,
            target,
            scheduled: false,
        }
    }

    /// Returns the display this link reports ticks for.
    #[must_use]
    pub fn display(&self) -> DisplayId {
        self.target.ivars().display
    }

    /// Returns whether the link is scheduled on the run loop.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

impl RefreshDriver for DisplayLink {
    type Error = Infallible;

    fn start(&mut self) -> Result<(), Infallible> {
        if !self.scheduled {
            self.target.ivars().restarted.set(true);
            // SAFETY: the main run loop outlives the link, and
            // `NSDefaultRunLoopMode` is a valid mode.
            unsafe {
                self.raw
                    .addToRunLoop_forMode(&NSRunLoop::mainRunLoop(), NSDefaultRunLoopMode);
            }
            self.scheduled = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Infallible> {
        if self.scheduled {
            // SAFETY: the link was added to this run loop and mode in `start`.
            unsafe {
                self.raw
                    .removeFromRunLoop_forMode(&NSRunLoop::mainRunLoop(), NSDefaultRunLoopMode);
            }
            self.scheduled = false;
        }
        Ok(())
    }

    fn now(&self) -> HostTime {
        mach_time::now()
    }

    fn timebase(&self) -> Timebase {
        self.target.ivars().timebase
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        self.raw.invalidate();
    }
}
