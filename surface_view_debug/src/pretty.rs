// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use surface_view_core::drawable::Acquisition;
use surface_view_core::time::{HostTime, Timebase};
use surface_view_core::trace::{
    DrawableEvent, FrameSkipEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    PresentEvent, TraceSink, VsyncTickEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Draw => "draw",
        PhaseKind::Release => "release",
    }
}

fn acquisition_name(acquisition: Acquisition) -> &'static str {
    match acquisition {
        Acquisition::NotRequested => "none",
        Acquisition::Acquired => "acquired",
        Acquisition::Unavailable => "UNAVAILABLE",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_vsync_tick(&mut self, e: &VsyncTickEvent) {
        let _ = writeln!(
            self.writer,
            "[vsync] tick={} display={} now={:.1}µs confidence={:?}",
            e.tick_index,
            e.display.0,
            self.host_us(e.now),
            e.confidence,
        );
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] tick={} reason={:?}",
            e.tick_index, e.reason,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_drawable(&mut self, e: &DrawableEvent) {
        let _ = writeln!(
            self.writer,
            "[drawable] frame={} {}",
            e.frame_index,
            acquisition_name(e.acquisition),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        match e.target_present {
            Some(target) => {
                let _ = writeln!(
                    self.writer,
                    "[present] frame={} at {:.1}µs target={:.1}µs",
                    e.frame_index,
                    self.host_us(e.recorded_at),
                    self.host_us(target),
                );
            }
            None => {
                let _ = writeln!(
                    self.writer,
                    "[present] frame={} at {:.1}µs",
                    e.frame_index,
                    self.host_us(e.recorded_at),
                );
            }
        }
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let outcome = if s.presented {
            "presented"
        } else if s.released {
            "released"
        } else {
            "dropped"
        };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} tick={} draw={:.1}µs release={:.1}µs drawable={} {outcome}",
            s.frame_index,
            s.tick_index,
            self.ticks_to_us(s.draw_ticks),
            self.ticks_to_us(s.release_ticks),
            acquisition_name(s.acquisition),
        );
    }
}
