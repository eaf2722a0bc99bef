// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Refresh ticks and frame summaries use the display id as `pid`; frame
//! phases and skips land on process 0.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use surface_view_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
///
/// # Errors
///
/// Returns any error from serializing to `writer`.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let us = |t: HostTime| ticks_to_us(t.ticks(), timebase);
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let event = match recorded {
            RecordedEvent::VsyncTick(e) => json!({
                "ph": "i",
                "name": "VsyncTick",
                "cat": "Display",
                "ts": us(e.now),
                "pid": e.display.0,
                "tid": 0,
                "s": "p",
                "args": {
                    "tick_index": e.tick_index,
                    "target_present_us": e.target_present.map(us),
                    "confidence": format!("{:?}", e.confidence),
                }
            }),
            RecordedEvent::FrameSkip(e) => json!({
                "ph": "i",
                "name": format!("Skip({:?})", e.reason),
                "cat": "Display",
                "ts": us(e.now),
                "pid": 0,
                "tid": 1,
                "s": "t",
                "args": {
                    "tick_index": e.tick_index,
                }
            }),
            RecordedEvent::PhaseBegin(e) => json!({
                "ph": "B",
                "name": format!("{:?}", e.phase),
                "cat": "Frame",
                "ts": us(e.timestamp),
                "pid": 0,
                "tid": 0,
                "args": {
                    "frame_index": e.frame_index,
                }
            }),
            RecordedEvent::PhaseEnd(e) => json!({
                "ph": "E",
                "name": format!("{:?}", e.phase),
                "cat": "Frame",
                "ts": us(e.timestamp),
                "pid": 0,
                "tid": 0,
                "args": {
                    "frame_index": e.frame_index,
                }
            }),
            // Acquisition outcomes are carried by the frame summary.
            RecordedEvent::Drawable(_) => continue,
            RecordedEvent::Present(e) => json!({
                "ph": "i",
                "name": "Present",
                "cat": "Frame",
                "ts": us(e.recorded_at),
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "frame_index": e.frame_index,
                    "target_present_us": e.target_present.map(us),
                }
            }),
            RecordedEvent::FrameSummary(s) => json!({
                "ph": "i",
                "name": "FrameSummary",
                "cat": "Summary",
                "ts": us(s.now),
                "pid": s.display.0,
                "tid": 0,
                "s": "g",
                "args": {
                    "frame_index": s.frame_index,
                    "tick_index": s.tick_index,
                    "draw_us": ticks_to_us(s.draw_ticks, timebase),
                    "release_us": ticks_to_us(s.release_ticks, timebase),
                    "acquisition": format!("{:?}", s.acquisition),
                    "presented": s.presented,
                    "released": s.released,
                }
            }),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use surface_view_core::drawable::Acquisition;
    use surface_view_core::render_loop::SkipReason;
    use surface_view_core::timing::{DisplayId, TimingConfidence};
    use surface_view_core::trace::{
        DrawableEvent, FrameSkipEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
        VsyncTickEvent,
    };

    fn export_to_values(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_vsync_tick(&VsyncTickEvent {
            tick_index: 0,
            display: DisplayId(2),
            now: HostTime(1_000_000),
            target_present: None,
            refresh_interval: Some(16_666_667),
            confidence: TimingConfidence::PacingOnly,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Draw,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Draw,
            timestamp: HostTime(1_000_500),
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "VsyncTick");
        assert_eq!(parsed[0]["pid"], 2);
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Draw");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 1000.5);
    }

    #[test]
    fn skips_are_named_by_reason() {
        let mut rec = RecorderSink::new();
        rec.on_frame_skip(&FrameSkipEvent {
            tick_index: 4,
            now: HostTime(2_000),
            reason: SkipReason::Interval,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed[0]["name"], "Skip(Interval)");
        assert_eq!(parsed[0]["args"]["tick_index"], 4);
    }

    #[test]
    fn drawable_events_are_folded_into_summaries() {
        let mut rec = RecorderSink::new();
        rec.on_drawable(&DrawableEvent {
            frame_index: 0,
            acquisition: Acquisition::Acquired,
        });
        assert!(export_to_values(&rec).is_empty());
    }

    #[test]
    fn export_empty_recording() {
        assert!(export_to_values(&RecorderSink::new()).is_empty());
    }
}
