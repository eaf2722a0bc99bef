// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use surface_view_core::drawable::Acquisition;
use surface_view_core::render_loop::SkipReason;
use surface_view_core::time::HostTime;
use surface_view_core::timing::{DisplayId, TimingConfidence};
use surface_view_core::trace::{
    DrawableEvent, FrameSkipEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    PresentEvent, TraceSink, VsyncTickEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_VSYNC_TICK: u8 = 1;
const TAG_FRAME_SKIP: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_DRAWABLE: u8 = 5;
const TAG_PRESENT: u8 = 6;
const TAG_FRAME_SUMMARY: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        self.write_bool(v.is_some());
        self.write_u64(v.unwrap_or(0));
    }

    fn write_confidence(&mut self, c: TimingConfidence) {
        self.write_u8(match c {
            TimingConfidence::Predictive => 0,
            TimingConfidence::Estimated => 1,
            TimingConfidence::PacingOnly => 2,
        });
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Draw => 0,
            PhaseKind::Release => 1,
        });
    }

    fn write_reason(&mut self, r: SkipReason) {
        self.write_u8(match r {
            SkipReason::Stopped => 0,
            SkipReason::Paused => 1,
            SkipReason::Detached => 2,
            SkipReason::Interval => 3,
        });
    }

    fn write_acquisition(&mut self, a: Acquisition) {
        self.write_u8(match a {
            Acquisition::NotRequested => 0,
            Acquisition::Acquired => 1,
            Acquisition::Unavailable => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_vsync_tick(&mut self, e: &VsyncTickEvent) {
        self.write_u8(TAG_VSYNC_TICK);
        self.write_u64(e.tick_index);
        self.write_u32(e.display.0);
        self.write_u64(e.now.ticks());
        self.write_option_u64(e.target_present.map(HostTime::ticks));
        self.write_option_u64(e.refresh_interval);
        self.write_confidence(e.confidence);
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        self.write_u8(TAG_FRAME_SKIP);
        self.write_u64(e.tick_index);
        self.write_u64(e.now.ticks());
        self.write_reason(e.reason);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_drawable(&mut self, e: &DrawableEvent) {
        self.write_u8(TAG_DRAWABLE);
        self.write_u64(e.frame_index);
        self.write_acquisition(e.acquisition);
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.write_u8(TAG_PRESENT);
        self.write_u64(e.frame_index);
        self.write_u64(e.recorded_at.ticks());
        self.write_option_u64(e.target_present.map(HostTime::ticks));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.tick_index);
        self.write_u32(s.display.0);
        self.write_confidence(s.confidence);
        self.write_u64(s.now.ticks());
        self.write_option_u64(s.target_present.map(HostTime::ticks));
        self.write_u64(s.draw_ticks);
        self.write_u64(s.release_ticks);
        self.write_acquisition(s.acquisition);
        self.write_bool(s.presented);
        self.write_bool(s.released);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`VsyncTickEvent`].
    VsyncTick(VsyncTickEvent),
    /// A [`FrameSkipEvent`].
    FrameSkip(FrameSkipEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`DrawableEvent`].
    Drawable(DrawableEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record and stays
/// stopped.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_bool()?;
        let val = self.read_u64()?;
        Some(present.then_some(val))
    }

    fn read_confidence(&mut self) -> Option<TimingConfidence> {
        Some(match self.read_u8()? {
            0 => TimingConfidence::Predictive,
            1 => TimingConfidence::Estimated,
            _ => TimingConfidence::PacingOnly,
        })
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Draw,
            _ => PhaseKind::Release,
        })
    }

    fn read_reason(&mut self) -> Option<SkipReason> {
        Some(match self.read_u8()? {
            0 => SkipReason::Stopped,
            1 => SkipReason::Paused,
            2 => SkipReason::Detached,
            _ => SkipReason::Interval,
        })
    }

    fn read_acquisition(&mut self) -> Option<Acquisition> {
        Some(match self.read_u8()? {
            0 => Acquisition::NotRequested,
            1 => Acquisition::Acquired,
            _ => Acquisition::Unavailable,
        })
    }

    fn decode_vsync_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::VsyncTick(VsyncTickEvent {
            tick_index: self.read_u64()?,
            display: DisplayId(self.read_u32()?),
            now: HostTime(self.read_u64()?),
            target_present: self.read_option_u64()?.map(HostTime),
            refresh_interval: self.read_option_u64()?,
            confidence: self.read_confidence()?,
        }))
    }

    fn decode_frame_skip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSkip(FrameSkipEvent {
            tick_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            reason: self.read_reason()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_drawable(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Drawable(DrawableEvent {
            frame_index: self.read_u64()?,
            acquisition: self.read_acquisition()?,
        }))
    }

    fn decode_present(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Present(PresentEvent {
            frame_index: self.read_u64()?,
            recorded_at: HostTime(self.read_u64()?),
            target_present: self.read_option_u64()?.map(HostTime),
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            tick_index: self.read_u64()?,
            display: DisplayId(self.read_u32()?),
            confidence: self.read_confidence()?,
            now: HostTime(self.read_u64()?),
            target_present: self.read_option_u64()?.map(HostTime),
            draw_ticks: self.read_u64()?,
            release_ticks: self.read_u64()?,
            acquisition: self.read_acquisition()?,
            presented: self.read_bool()?,
            released: self.read_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = match self.read_u8()? {
            TAG_VSYNC_TICK => self.decode_vsync_tick(),
            TAG_FRAME_SKIP => self.decode_frame_skip(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_DRAWABLE => self.decode_drawable(),
            TAG_PRESENT => self.decode_present(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None,
        };
        if event.is_none() {
            // Never resume inside a bad record.
            self.pos = self.data.len();
        }
        event
    }
}

impl core::iter::FusedIterator for DecodeIter<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
