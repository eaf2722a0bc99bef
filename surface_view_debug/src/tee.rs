// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use surface_view_core::trace::{
    DrawableEvent, FrameSkipEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PresentEvent,
    TraceSink, VsyncTickEvent,
};

/// A [`TraceSink`] that forwards every event to `A`, then `B`.
///
/// A [`Tracer`](surface_view_core::trace::Tracer) holds one sink; nest `Tee`s
/// to reach more.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    /// First receiver.
    pub first: A,
    /// Second receiver.
    pub second: B,
}

impl<A, B> Tee<A, B> {
    /// Pairs two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Splits the tee back into its sinks.
    #[must_use]
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_vsync_tick(&mut self, e: &VsyncTickEvent) {
        self.first.on_vsync_tick(e);
        self.second.on_vsync_tick(e);
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        self.first.on_frame_skip(e);
        self.second.on_frame_skip(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_drawable(&mut self, e: &DrawableEvent) {
        self.first.on_drawable(e);
        self.second.on_drawable(e);
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.first.on_present(e);
        self.second.on_present(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.first.on_frame_summary(s);
        self.second.on_frame_summary(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use surface_view_core::render_loop::SkipReason;
    use surface_view_core::time::HostTime;

    #[test]
    fn both_sinks_receive_events() {
        let mut tee = Tee::new(RecorderSink::new(), RecorderSink::new());
        tee.on_frame_skip(&FrameSkipEvent {
            tick_index: 0,
            now: HostTime(0),
            reason: SkipReason::Stopped,
        });
        let (a, b) = tee.into_inner();
        assert_eq!(decode(a.as_bytes()).count(), 1);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
