// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! render loop calls as each tick is handled. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects phase timestamps and outcomes during a
//! frame and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::drawable::Acquisition;
use crate::render_loop::SkipReason;
use crate::time::HostTime;
use crate::timing::{DisplayId, TimingConfidence, VsyncTick};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of a frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// The render delegate's `draw` call, including drawable acquisition and
    /// presentation.
    Draw,
    /// Returning an unpresented drawable and updating counters.
    Release,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every refresh tick the view receives.
#[derive(Clone, Copy, Debug)]
pub struct VsyncTickEvent {
    /// Driver tick counter.
    pub tick_index: u64,
    /// Which display produced the tick.
    pub display: DisplayId,
    /// Host time when the tick was generated.
    pub now: HostTime,
    /// Predicted present time, if known.
    pub target_present: Option<HostTime>,
    /// Refresh interval in ticks, if known.
    pub refresh_interval: Option<u64>,
    /// Timing confidence for this tick.
    pub confidence: TimingConfidence,
}

impl From<&VsyncTick> for VsyncTickEvent {
    fn from(tick: &VsyncTick) -> Self {
        Self {
            tick_index: tick.tick_index,
            display: tick.display,
            now: tick.now,
            target_present: tick.target_present,
            refresh_interval: tick.refresh_interval.map(|d| d.ticks()),
            confidence: tick.confidence,
        }
    }
}

/// Emitted when a tick does not produce a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameSkipEvent {
    /// Driver tick counter.
    pub tick_index: u64,
    /// Host time of the skipped tick.
    pub now: HostTime,
    /// Why no frame was drawn.
    pub reason: SkipReason,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after the delegate returns, describing drawable acquisition.
#[derive(Clone, Copy, Debug)]
pub struct DrawableEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What happened when the frame asked for a drawable.
    pub acquisition: Acquisition,
}

/// Emitted when a frame's drawable was presented.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time observed after the delegate returned.
    pub recorded_at: HostTime,
    /// When the drawable is expected on screen, if known.
    pub target_present: Option<HostTime>,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Tick that produced the frame.
    pub tick_index: u64,
    /// Which display.
    pub display: DisplayId,
    /// Timing confidence.
    pub confidence: TimingConfidence,
    /// Host time when the tick was generated.
    pub now: HostTime,
    /// Predicted present time, if known.
    pub target_present: Option<HostTime>,
    /// Draw phase duration in ticks (0 if not measured).
    pub draw_ticks: u64,
    /// Release phase duration in ticks (0 if not measured).
    pub release_ticks: u64,
    /// Drawable acquisition outcome.
    pub acquisition: Acquisition,
    /// Whether a drawable was presented.
    pub presented: bool,
    /// Whether an unpresented drawable was released.
    pub released: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a refresh tick is received.
    fn on_vsync_tick(&mut self, e: &VsyncTickEvent) {
        _ = e;
    }

    /// Called when a tick is skipped.
    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with the drawable acquisition outcome of a frame.
    fn on_drawable(&mut self, e: &DrawableEvent) {
        _ = e;
    }

    /// Called when a frame's drawable was presented.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($self:ident, $method:ident, $event:expr) => {{
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut $self.sink {
            sink.$method($event);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $event;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`VsyncTickEvent`].
    #[inline]
    pub fn vsync_tick(&mut self, e: &VsyncTickEvent) {
        emit!(self, on_vsync_tick, e);
    }

    /// Emits a [`FrameSkipEvent`].
    #[inline]
    pub fn frame_skip(&mut self, e: &FrameSkipEvent) {
        emit!(self, on_frame_skip, e);
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        emit!(self, on_phase_begin, e);
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        emit!(self, on_phase_end, e);
    }

    /// Emits a [`DrawableEvent`].
    #[inline]
    pub fn drawable(&mut self, e: &DrawableEvent) {
        emit!(self, on_drawable, e);
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        emit!(self, on_present, e);
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        emit!(self, on_frame_summary, s);
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps and outcomes during a frame and produces a
/// [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    tick: VsyncTickEvent,
    phase_starts: [Option<HostTime>; 2],
    phase_ends: [Option<HostTime>; 2],
    acquisition: Acquisition,
    presented: bool,
    released: bool,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame and tick.
    #[must_use]
    pub fn new(frame_index: u64, tick: &VsyncTickEvent) -> Self {
        Self {
            frame_index,
            tick: *tick,
            phase_starts: [None; 2],
            phase_ends: [None; 2],
            acquisition: Acquisition::NotRequested,
            presented: false,
            released: false,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Records the frame's outcome.
    pub fn set_outcome(&mut self, acquisition: Acquisition, presented: bool, released: bool) {
        self.acquisition = acquisition;
        self.presented = presented;
        self.released = released;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame_index,
            tick_index: self.tick.tick_index,
            display: self.tick.display,
            confidence: self.tick.confidence,
            now: self.tick.now,
            target_present: self.tick.target_present,
            draw_ticks: self.phase_duration(PhaseKind::Draw),
            release_ticks: self.phase_duration(PhaseKind::Release),
            acquisition: self.acquisition,
            presented: self.presented,
            released: self.released,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Draw => 0,
        PhaseKind::Release => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
