// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render-surface view.
//!
//! [`RenderSurfaceView`] ties a host view, the GPU layer behind it and a
//! refresh driver to a [`RenderLoop`]. Applications hold one per on-screen
//! surface, start it with [`dispatch_game_loop`], and forward every refresh
//! tick from the backend to [`on_vsync`].
//!
//! # Frame loop
//!
//! ```rust,ignore
//! view.dispatch_game_loop()?;
//!
//! // In the backend's refresh callback:
//! fn on_tick(tick: VsyncTick) {
//!     view.on_vsync(&tick, &mut |frame: &mut Frame<'_, _>| {
//!         if let Some(drawable) = frame.current_drawable() {
//!             encode_commands(drawable, frame.timestamp());
//!             frame.present();
//!         }
//!     });
//! }
//! ```
//!
//! [`dispatch_game_loop`]: RenderSurfaceView::dispatch_game_loop
//! [`on_vsync`]: RenderSurfaceView::on_vsync

use core::fmt;

use crate::backend::{PlatformView, RefreshDriver};
use crate::config::ViewConfig;
use crate::drawable::{Acquisition, DrawableSlot, DrawableSource};
use crate::frame::{Frame, RenderDelegate};
use crate::render_loop::{FrameCounters, LoopState, RenderLoop, SkipReason};
use crate::timing::{DisplayId, VsyncTick};
use crate::trace::{
    DrawableEvent, FrameSkipEvent, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    PresentEvent, Tracer, VsyncTickEvent,
};

/// What a drawn frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter.
    pub frame_index: u64,
    /// Drawable acquisition outcome.
    pub acquisition: Acquisition,
    /// Whether a drawable was presented.
    pub presented: bool,
    /// Whether an unpresented drawable was released back to the layer.
    pub released: bool,
}

/// Result of handling one refresh tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick did not produce a frame.
    Skipped(SkipReason),
    /// The delegate drew a frame.
    Drawn(FrameReport),
}

impl TickOutcome {
    /// Returns `true` if the tick produced a frame.
    #[must_use]
    pub const fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }
}

/// A view owning a GPU-presentable layer and a pausable render loop.
///
/// - `V` is the host view ([`PlatformView`]).
/// - `S` is the layer producing drawables ([`DrawableSource`]).
/// - `R` drives refresh callbacks ([`RefreshDriver`]).
pub struct RenderSurfaceView<V, S: DrawableSource, R> {
    view: V,
    source: S,
    driver: R,
    render_loop: RenderLoop,
    slot: DrawableSlot<S::Drawable>,
    display: DisplayId,
}

impl<V, S: DrawableSource, R> fmt::Debug for RenderSurfaceView<V, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSurfaceView")
            .field("render_loop", &self.render_loop)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl<V, S, R> RenderSurfaceView<V, S, R>
where
    V: PlatformView,
    S: DrawableSource,
    R: RefreshDriver,
{
    /// Creates a view with a stopped loop.
    #[must_use]
    pub fn new(view: V, source: S, driver: R, config: ViewConfig) -> Self {
        Self {
            view,
            source,
            driver,
            render_loop: RenderLoop::new(config.interval, config.start_paused),
            slot: DrawableSlot::new(),
            display: config.display,
        }
    }

    /// Starts the refresh-driven render loop.
    ///
    /// Does nothing if the loop is already running.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if refresh callbacks could not be started;
    /// the loop then stays stopped.
    pub fn dispatch_game_loop(&mut self) -> Result<(), R::Error> {
        if self.render_loop.is_running() {
            return Ok(());
        }
        self.driver.start()?;
        self.render_loop.dispatch();
        Ok(())
    }

    /// Stops the render loop.
    ///
    /// Any drawable held for the next frame is released, even if the loop
    /// was already stopped. The driver is only stopped once.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if stopping callbacks failed. The loop is
    /// marked stopped regardless, so late ticks are skipped.
    pub fn stop_game_loop(&mut self) -> Result<(), R::Error> {
        self.slot.release();
        if !self.render_loop.stop() {
            return Ok(());
        }
        self.driver.stop()
    }

    /// Returns the drawable for the upcoming frame, acquiring it from the
    /// layer if none is held.
    ///
    /// Returns `None` when the surface cannot produce a drawable. A drawable
    /// obtained here is kept for the next drawn frame.
    pub fn current_drawable(&mut self) -> Option<&S::Drawable> {
        self.slot.acquire(&mut self.source)
    }

    /// Returns the presentation interval.
    #[must_use]
    pub fn interval(&self) -> u64 {
        self.render_loop.interval()
    }

    /// Sets the number of refresh ticks between presentations.
    pub fn set_interval(&mut self, interval: u64) {
        self.render_loop.set_interval(interval);
    }

    /// Returns whether the loop is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.render_loop.is_paused()
    }

    /// Pauses or resumes frame advancement without stopping the loop.
    pub fn set_paused(&mut self, paused: bool) {
        self.render_loop.set_paused(paused);
    }

    /// Returns whether the loop is running.
    #[must_use]
    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    /// Returns the loop's running totals.
    #[must_use]
    pub fn counters(&self) -> &FrameCounters {
        self.render_loop.counters()
    }

    /// Returns the display this view draws for.
    #[must_use]
    pub fn display(&self) -> DisplayId {
        self.display
    }

    /// Returns the host view.
    #[must_use]
    pub fn platform_view(&self) -> &V {
        &self.view
    }

    /// Returns the host view mutably.
    pub fn platform_view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Returns the layer.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the layer mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns the refresh driver.
    #[must_use]
    pub fn driver(&self) -> &R {
        &self.driver
    }

    /// Handles one refresh tick without tracing.
    pub fn on_vsync<D>(&mut self, tick: &VsyncTick, delegate: &mut D) -> TickOutcome
    where
        D: RenderDelegate<S> + ?Sized,
    {
        self.on_vsync_traced(tick, delegate, &mut Tracer::none())
    }

    /// Handles one refresh tick, reporting to `tracer`.
    ///
    /// If the loop admits the tick, `delegate` draws a frame; a drawable it
    /// leaves unpresented is released afterwards.
    pub fn on_vsync_traced<D>(
        &mut self,
        tick: &VsyncTick,
        delegate: &mut D,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome
    where
        D: RenderDelegate<S> + ?Sized,
    {
        let tick_event = VsyncTickEvent::from(tick);
        tracer.vsync_tick(&tick_event);

        let admitted = match self.render_loop.admit(tick, self.view.is_attached()) {
            Ok(admitted) => admitted,
            Err(reason) => {
                tracer.frame_skip(&FrameSkipEvent {
                    tick_index: tick.tick_index,
                    now: tick.now,
                    reason,
                });
                return TickOutcome::Skipped(reason);
            }
        };
        let frame_index = admitted.frame_index;
        let mut summary = FrameSummaryBuilder::new(frame_index, &tick_event);

        // Draw.
        self.slot.begin_frame();
        let draw_start = self.driver.now();
        summary.phase_begin(PhaseKind::Draw, draw_start);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Draw,
            timestamp: draw_start,
        });

        let presented = {
            let mut frame = Frame::new(
                tick,
                frame_index,
                admitted.previous_frame_time,
                self.render_loop.interval(),
                &mut self.source,
                &mut self.slot,
            );
            delegate.draw(&mut frame);
            frame.is_presented()
        };

        let draw_end = self.driver.now();
        summary.phase_end(PhaseKind::Draw, draw_end);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Draw,
            timestamp: draw_end,
        });

        let acquisition = self.slot.acquisition();
        tracer.drawable(&DrawableEvent {
            frame_index,
            acquisition,
        });
        if presented {
            tracer.present(&PresentEvent {
                frame_index,
                recorded_at: draw_end,
                target_present: tick.target_present,
            });
        }

        // Release.
        summary.phase_begin(PhaseKind::Release, draw_end);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Release,
            timestamp: draw_end,
        });
        let released = self.slot.release();
        self.render_loop.finish_frame(
            presented,
            acquisition == Acquisition::Unavailable,
            released,
        );
        let release_end = self.driver.now();
        summary.phase_end(PhaseKind::Release, release_end);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Release,
            timestamp: release_end,
        });

        summary.set_outcome(acquisition, presented, released);
        tracer.frame_summary(&summary.finish());

        TickOutcome::Drawn(FrameReport {
            frame_index,
            acquisition,
            presented,
            released,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::fmt;

    use kurbo::Size;

    use super::*;
    use crate::drawable::Drawable;
    use crate::time::{Duration, HostTime, Timebase};
    use crate::timing::TimingConfidence;

    // -- test doubles --------------------------------------------------------

    struct Host {
        attached: bool,
    }

    impl PlatformView for Host {
        fn bounds_size(&self) -> Size {
            Size::new(320.0, 240.0)
        }

        fn scale_factor(&self) -> f64 {
            1.0
        }

        fn is_attached(&self) -> bool {
            self.attached
        }
    }

    #[derive(Debug)]
    struct Target {
        id: u32,
        presented: Rc<Cell<u32>>,
    }

    impl Drawable for Target {
        fn present(&self) {
            self.presented.set(self.presented.get() + 1);
        }
    }

    struct Layer {
        ready: bool,
        handed_out: u32,
        presented: Rc<Cell<u32>>,
    }

    impl DrawableSource for Layer {
        type Drawable = Target;

        fn next_drawable(&mut self) -> Option<Target> {
            if !self.ready {
                return None;
            }
            self.handed_out += 1;
            Some(Target {
                id: self.handed_out,
                presented: Rc::clone(&self.presented),
            })
        }

        fn drawable_size(&self) -> Size {
            Size::new(320.0, 240.0)
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refused")
        }
    }

    impl core::error::Error for Refused {}

    #[derive(Default)]
    struct Driver {
        starts: u32,
        stops: u32,
        refuse_start: bool,
        refuse_stop: bool,
    }

    impl RefreshDriver for Driver {
        type Error = Refused;

        fn start(&mut self) -> Result<(), Refused> {
            if self.refuse_start {
                return Err(Refused);
            }
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Refused> {
            if self.refuse_stop {
                return Err(Refused);
            }
            self.stops += 1;
            Ok(())
        }

        fn now(&self) -> HostTime {
            HostTime(0)
        }

        fn timebase(&self) -> Timebase {
            Timebase::NANOS
        }
    }

    type TestView = RenderSurfaceView<Host, Layer, Driver>;

    fn make_view(config: ViewConfig) -> TestView {
        RenderSurfaceView::new(
            Host { attached: true },
            Layer {
                ready: true,
                handed_out: 0,
                presented: Rc::new(Cell::new(0)),
            },
            Driver::default(),
            config,
        )
    }

    fn tick(index: u64) -> VsyncTick {
        VsyncTick {
            now: HostTime(index * 16_000),
            target_present: Some(HostTime(index * 16_000 + 16_000)),
            refresh_interval: Some(Duration(16_000)),
            confidence: TimingConfidence::Predictive,
            tick_index: index,
            display: DisplayId(0),
            prev_actual_present: None,
        }
    }

    fn present_each_frame(frame: &mut Frame<'_, Layer>) {
        if frame.current_drawable().is_some() {
            frame.present();
        }
    }

    // -- lifecycle -----------------------------------------------------------

    #[test]
    fn dispatch_then_stop() {
        let mut view = make_view(ViewConfig::default());
        assert_eq!(view.loop_state(), LoopState::Stopped);

        view.dispatch_game_loop().unwrap();
        assert_eq!(view.loop_state(), LoopState::Running);

        view.stop_game_loop().unwrap();
        assert_eq!(view.loop_state(), LoopState::Stopped);
    }

    #[test]
    fn dispatch_and_stop_are_idempotent() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.dispatch_game_loop().unwrap();
        assert_eq!(view.driver().starts, 1, "driver started once");

        view.stop_game_loop().unwrap();
        view.stop_game_loop().unwrap();
        assert_eq!(view.driver().stops, 1, "driver stopped once");
    }

    #[test]
    fn failed_start_leaves_loop_stopped() {
        let mut view = make_view(ViewConfig::default());
        view.driver.refuse_start = true;
        assert_eq!(view.dispatch_game_loop(), Err(Refused));
        assert_eq!(view.loop_state(), LoopState::Stopped);
    }

    #[test]
    fn failed_stop_still_gates_ticks() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.driver.refuse_stop = true;

        assert_eq!(view.stop_game_loop(), Err(Refused));
        assert_eq!(view.loop_state(), LoopState::Stopped);

        let outcome = view.on_vsync(&tick(0), &mut present_each_frame);
        assert_eq!(outcome, TickOutcome::Skipped(SkipReason::Stopped));
    }

    // -- ticks ---------------------------------------------------------------

    #[test]
    fn stopped_view_skips_ticks() {
        let mut view = make_view(ViewConfig::default());
        let outcome = view.on_vsync(&tick(0), &mut present_each_frame);
        assert_eq!(outcome, TickOutcome::Skipped(SkipReason::Stopped));
    }

    #[test]
    fn running_view_presents_frames() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        for i in 0..3 {
            assert!(view.on_vsync(&tick(i), &mut present_each_frame).is_drawn());
        }
        assert_eq!(view.source().presented.get(), 3);
        assert_eq!(view.counters().frames_presented, 3);
    }

    #[test]
    fn pause_suppresses_presentation_and_resume_restores_it() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.on_vsync(&tick(0), &mut present_each_frame);

        view.set_paused(true);
        assert!(view.is_paused());
        for i in 1..4 {
            assert_eq!(
                view.on_vsync(&tick(i), &mut present_each_frame),
                TickOutcome::Skipped(SkipReason::Paused)
            );
        }
        assert_eq!(view.loop_state(), LoopState::Running);
        assert_eq!(view.source().presented.get(), 1, "nothing presented while paused");

        view.set_paused(false);
        assert!(view.on_vsync(&tick(4), &mut present_each_frame).is_drawn());
        assert_eq!(view.source().presented.get(), 2);
    }

    #[test]
    fn start_paused_config() {
        let mut view = make_view(ViewConfig::every_vsync().with_start_paused(true));
        view.dispatch_game_loop().unwrap();
        assert_eq!(
            view.on_vsync(&tick(0), &mut present_each_frame),
            TickOutcome::Skipped(SkipReason::Paused)
        );
    }

    #[test]
    fn interval_draws_one_frame_per_group() {
        let mut view = make_view(ViewConfig::every_vsync().with_interval(3));
        view.dispatch_game_loop().unwrap();
        let drawn: Vec<bool> = (0..9)
            .map(|i| view.on_vsync(&tick(i), &mut present_each_frame).is_drawn())
            .collect();
        assert_eq!(
            drawn,
            [true, false, false, true, false, false, true, false, false]
        );
        assert_eq!(view.counters().skipped_interval, 6);
    }

    #[test]
    fn interval_round_trips() {
        let mut view = make_view(ViewConfig::default());
        for value in [0, 1, 5, u64::MAX] {
            view.set_interval(value);
            assert_eq!(view.interval(), value);
        }
    }

    #[test]
    fn detached_view_does_not_draw() {
        let mut view = make_view(ViewConfig::default());
        view.platform_view_mut().attached = false;
        view.dispatch_game_loop().unwrap();
        assert_eq!(
            view.on_vsync(&tick(0), &mut present_each_frame),
            TickOutcome::Skipped(SkipReason::Detached)
        );
    }

    // -- drawables -----------------------------------------------------------

    #[test]
    fn current_drawable_absent_when_surface_not_ready() {
        let mut view = make_view(ViewConfig::default());
        view.source_mut().ready = false;
        assert!(view.current_drawable().is_none());

        view.source_mut().ready = true;
        assert!(view.current_drawable().is_some());
    }

    #[test]
    fn unavailable_drawable_is_counted_not_fatal() {
        let mut view = make_view(ViewConfig::default());
        view.source_mut().ready = false;
        view.dispatch_game_loop().unwrap();

        let outcome = view.on_vsync(&tick(0), &mut present_each_frame);
        let TickOutcome::Drawn(report) = outcome else {
            panic!("frame should be drawn, got {outcome:?}");
        };
        assert_eq!(report.acquisition, Acquisition::Unavailable);
        assert!(!report.presented);
        assert_eq!(view.counters().drawable_unavailable, 1);
    }

    #[test]
    fn unpresented_drawable_is_released() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();

        let mut peek_only = |frame: &mut Frame<'_, Layer>| {
            let _ = frame.current_drawable();
        };
        let outcome = view.on_vsync(&tick(0), &mut peek_only);
        assert_eq!(
            outcome,
            TickOutcome::Drawn(FrameReport {
                frame_index: 0,
                acquisition: Acquisition::Acquired,
                presented: false,
                released: true,
            })
        );
        assert_eq!(view.counters().drawables_released, 1);

        // The next frame gets a fresh drawable.
        let mut seen = 0;
        let mut record = |frame: &mut Frame<'_, Layer>| {
            seen = frame.current_drawable().map_or(0, |d| d.id);
        };
        view.on_vsync(&tick(1), &mut record);
        assert_eq!(seen, 2);
    }

    #[test]
    fn drawable_acquired_before_frame_is_used_by_it() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        let early = view.current_drawable().map(|d| d.id);

        let mut seen = None;
        let mut record = |frame: &mut Frame<'_, Layer>| {
            seen = frame.current_drawable().map(|d| d.id);
            frame.present();
        };
        view.on_vsync(&tick(0), &mut record);
        assert_eq!(seen, early);
    }

    #[test]
    fn stop_releases_held_drawable() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        assert!(view.current_drawable().is_some());
        view.stop_game_loop().unwrap();
        assert!(view.slot.peek().is_none());
    }

    #[test]
    fn stop_on_stopped_view_releases_drawable() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.stop_game_loop().unwrap();

        assert!(view.current_drawable().is_some());
        view.stop_game_loop().unwrap();
        assert!(view.slot.peek().is_none(), "drawable kept after stop");
        assert_eq!(view.driver().stops, 1, "driver stopped once");
    }

    // -- frame context -------------------------------------------------------

    #[test]
    fn frame_reports_timing() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();

        let mut deltas = Vec::new();
        let mut record = |frame: &mut Frame<'_, Layer>| {
            deltas.push((frame.frame_index(), frame.timestamp(), frame.delta()));
        };
        view.on_vsync(&tick(0), &mut record);
        view.on_vsync(&tick(1), &mut record);

        assert_eq!(
            deltas,
            [
                (0, HostTime(16_000), None),
                (1, HostTime(32_000), Some(Duration(16_000))),
            ]
        );
    }

    #[test]
    fn present_without_drawable_returns_false() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        let mut result = true;
        let mut try_present = |frame: &mut Frame<'_, Layer>| {
            result = frame.present();
        };
        view.on_vsync(&tick(0), &mut try_present);
        assert!(!result);
    }

    #[test]
    fn delegate_can_be_a_trait_object() {
        let mut view = make_view(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        let mut closure = present_each_frame;
        let delegate: &mut dyn RenderDelegate<Layer> = &mut closure;
        assert!(view.on_vsync(&tick(0), delegate).is_drawn());
    }
}
