// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame context handed to render delegates.

use kurbo::Size;

use crate::drawable::{Drawable, DrawableSlot, DrawableSource};
use crate::time::{Duration, HostTime};
use crate::timing::VsyncTick;

/// Draws frames for a [`RenderSurfaceView`](crate::view::RenderSurfaceView).
///
/// Any `FnMut(&mut Frame<'_, S>)` closure is a delegate.
pub trait RenderDelegate<S: DrawableSource> {
    /// Draws one frame.
    ///
    /// Call [`Frame::current_drawable`] to get the render target and
    /// [`Frame::present`] when the frame's GPU work has been encoded. A
    /// drawable that is not presented is released when this returns.
    fn draw(&mut self, frame: &mut Frame<'_, S>);
}

impl<S, F> RenderDelegate<S> for F
where
    S: DrawableSource,
    F: FnMut(&mut Frame<'_, S>),
{
    fn draw(&mut self, frame: &mut Frame<'_, S>) {
        self(frame);
    }
}

/// One admitted frame of the render loop.
///
/// Borrows the view's layer and drawable slot for the duration of
/// [`RenderDelegate::draw`].
pub struct Frame<'a, S: DrawableSource> {
    tick: &'a VsyncTick,
    frame_index: u64,
    previous_frame_time: Option<HostTime>,
    interval: u64,
    source: &'a mut S,
    slot: &'a mut DrawableSlot<S::Drawable>,
    presented: bool,
}

impl<S: DrawableSource> core::fmt::Debug for Frame<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_index", &self.frame_index)
            .field("tick_index", &self.tick.tick_index)
            .field("presented", &self.presented)
            .finish_non_exhaustive()
    }
}

impl<'a, S: DrawableSource> Frame<'a, S> {
    pub(crate) fn new(
        tick: &'a VsyncTick,
        frame_index: u64,
        previous_frame_time: Option<HostTime>,
        interval: u64,
        source: &'a mut S,
        slot: &'a mut DrawableSlot<S::Drawable>,
    ) -> Self {
        Self {
            tick,
            frame_index,
            previous_frame_time,
            interval,
            source,
            slot,
            presented: false,
        }
    }

    /// Returns the frame counter. It starts at zero and is not reset by
    /// stopping the loop.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns the refresh tick that produced this frame.
    #[must_use]
    pub fn tick(&self) -> &VsyncTick {
        self.tick
    }

    /// Returns the time this frame represents: the predicted present time
    /// when known, otherwise the tick time.
    ///
    /// Animations should be evaluated at this time.
    #[must_use]
    pub fn timestamp(&self) -> HostTime {
        self.tick.frame_time()
    }

    /// Returns the time since the previous frame of this run, or `None` for
    /// the first frame after starting or resuming.
    #[must_use]
    pub fn delta(&self) -> Option<Duration> {
        self.previous_frame_time
            .map(|prev| self.timestamp().saturating_duration_since(prev))
    }

    /// Returns the presentation interval in effect for this frame.
    #[must_use]
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Returns the size of the layer's drawables in pixels.
    #[must_use]
    pub fn drawable_size(&self) -> Size {
        self.source.drawable_size()
    }

    /// Returns the drawable for this frame, acquiring it from the layer on
    /// first use.
    ///
    /// Returns `None` when the surface cannot produce a drawable.
    pub fn current_drawable(&mut self) -> Option<&S::Drawable> {
        self.slot.acquire(&mut *self.source)
    }

    /// Presents the current drawable.
    ///
    /// Returns `false` if no drawable had been acquired. After presenting, the
    /// next [`current_drawable`](Self::current_drawable) call acquires a
    /// fresh drawable.
    pub fn present(&mut self) -> bool {
        match self.slot.take() {
            Some(drawable) => {
                drawable.present();
                self.presented = true;
                true
            }
            None => false,
        }
    }

    /// Returns `true` once a drawable has been presented in this frame.
    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.presented
    }
}
