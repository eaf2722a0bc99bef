// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-loop state machine.
//!
//! The loop lives in `{Stopped, Running} × {Paused, Active}`:
//!
//! ```text
//!            dispatch()                 set_paused(true)
//!   Stopped ───────────► Running+Active ◄───────────────► Running+Paused
//!      ▲                      │         set_paused(false)        │
//!      └──────── stop() ──────┴──────────────────────────────────┘
//! ```
//!
//! [`RenderLoop::admit`] turns each refresh tick into either a frame to draw
//! or a [`SkipReason`]. Pausing keeps the loop running; ticks keep arriving
//! and are skipped until the flag is cleared.

use crate::interval::IntervalGate;
use crate::time::HostTime;
use crate::timing::VsyncTick;

/// Whether the loop is receiving refresh ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// No refresh callbacks are scheduled.
    #[default]
    Stopped,
    /// The refresh driver is delivering ticks.
    Running,
}

/// Why a tick did not produce a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The tick arrived after the loop was stopped.
    Stopped,
    /// The loop is paused.
    Paused,
    /// The host view is not in a window.
    Detached,
    /// The presentation interval has not elapsed.
    Interval,
}

/// Running totals kept by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounters {
    /// Ticks delivered to the loop.
    pub ticks: u64,
    /// Frames handed to the render delegate.
    pub frames_drawn: u64,
    /// Frames whose drawable was presented.
    pub frames_presented: u64,
    /// Ticks skipped because the loop was stopped.
    pub skipped_stopped: u64,
    /// Ticks skipped because the loop was paused.
    pub skipped_paused: u64,
    /// Ticks skipped because the host view was detached.
    pub skipped_detached: u64,
    /// Ticks skipped by the presentation interval.
    pub skipped_interval: u64,
    /// Frames that asked for a drawable and never got one.
    pub drawable_unavailable: u64,
    /// Drawables released at frame end without being presented.
    pub drawables_released: u64,
}

impl FrameCounters {
    fn record_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::Stopped => &mut self.skipped_stopped,
            SkipReason::Paused => &mut self.skipped_paused,
            SkipReason::Detached => &mut self.skipped_detached,
            SkipReason::Interval => &mut self.skipped_interval,
        };
        *counter += 1;
    }
}

/// A tick admitted by the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admitted {
    /// Index of the frame about to be drawn. Counts from zero when the loop
    /// is created and keeps counting across stop and dispatch.
    pub frame_index: u64,
    /// Frame time of the previously drawn frame in this run, if any.
    pub previous_frame_time: Option<HostTime>,
}

/// The loop's state, flags, gate and counters.
#[derive(Clone, Debug)]
pub struct RenderLoop {
    state: LoopState,
    paused: bool,
    interval: u64,
    gate: IntervalGate,
    next_frame_index: u64,
    last_frame_time: Option<HostTime>,
    counters: FrameCounters,
}

impl RenderLoop {
    /// Creates a stopped loop with the given interval and paused flag.
    #[must_use]
    pub const fn new(interval: u64, paused: bool) -> Self {
        Self {
            state: LoopState::Stopped,
            paused,
            interval,
            gate: IntervalGate::new(),
            next_frame_index: 0,
            last_frame_time: None,
            counters: FrameCounters {
                ticks: 0,
                frames_drawn: 0,
                frames_presented: 0,
                skipped_stopped: 0,
                skipped_paused: 0,
                skipped_detached: 0,
                skipped_interval: 0,
                drawable_unavailable: 0,
                drawables_released: 0,
            },
        }
    }

    /// Returns the current loop state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Returns `true` while the loop is running (paused or not).
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running)
    }

    /// Moves to [`LoopState::Running`].
    ///
    /// Returns `false` if the loop was already running, in which case nothing
    /// changes.
    pub fn dispatch(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.gate.reset();
        self.last_frame_time = None;
        true
    }

    /// Moves to [`LoopState::Stopped`].
    ///
    /// Returns `false` if the loop was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = LoopState::Stopped;
        true
    }

    /// Returns whether frame advancement is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspends or resumes frame advancement.
    ///
    /// Resuming admits the next tick regardless of the interval.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused && !paused {
            self.gate.reset();
            self.last_frame_time = None;
        }
        self.paused = paused;
    }

    /// Returns the presentation interval, exactly as last set.
    #[must_use]
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Sets the presentation interval.
    ///
    /// No validation is applied; zero is stored as-is and gated like one.
    pub fn set_interval(&mut self, interval: u64) {
        self.interval = interval;
        self.gate.clamp_to(interval);
    }

    /// Decides what to do with a tick.
    ///
    /// `attached` reports whether the host view is currently in a window.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the tick must not produce a frame.
    pub fn admit(&mut self, tick: &VsyncTick, attached: bool) -> Result<Admitted, SkipReason> {
        self.counters.ticks += 1;

        let decision = if !self.is_running() {
            Err(SkipReason::Stopped)
        } else if self.paused {
            Err(SkipReason::Paused)
        } else if !attached {
            Err(SkipReason::Detached)
        } else if !self.gate.admit(self.interval) {
            Err(SkipReason::Interval)
        } else {
            let admitted = Admitted {
                frame_index: self.next_frame_index,
                previous_frame_time: self.last_frame_time,
            };
            self.next_frame_index += 1;
            self.last_frame_time = Some(tick.frame_time());
            self.counters.frames_drawn += 1;
            Ok(admitted)
        };

        if let Err(reason) = decision {
            self.counters.record_skip(reason);
        }
        decision
    }

    /// Records the outcome of a drawn frame.
    pub fn finish_frame(&mut self, presented: bool, drawable_missing: bool, released: bool) {
        if presented {
            self.counters.frames_presented += 1;
        }
        if drawable_missing {
            self.counters.drawable_unavailable += 1;
        }
        if released {
            self.counters.drawables_released += 1;
        }
    }

    /// Returns the running totals.
    #[must_use]
    pub const fn counters(&self) -> &FrameCounters {
        &self.counters
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(1, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Duration;
    use crate::timing::{DisplayId, TimingConfidence};

    fn tick(index: u64) -> VsyncTick {
        VsyncTick {
            now: HostTime(index * 1_000),
            target_present: Some(HostTime(index * 1_000 + 1_000)),
            refresh_interval: Some(Duration(1_000)),
            confidence: TimingConfidence::Predictive,
            tick_index: index,
            display: DisplayId(0),
            prev_actual_present: None,
        }
    }

    #[test]
    fn dispatch_and_stop_transition_state() {
        let mut lp = RenderLoop::default();
        assert_eq!(lp.state(), LoopState::Stopped);

        assert!(lp.dispatch());
        assert_eq!(lp.state(), LoopState::Running);
        assert!(!lp.dispatch(), "second dispatch is a no-op");

        assert!(lp.stop());
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(!lp.stop(), "second stop is a no-op");
    }

    #[test]
    fn stopped_loop_skips_ticks() {
        let mut lp = RenderLoop::default();
        assert_eq!(lp.admit(&tick(0), true), Err(SkipReason::Stopped));
        assert_eq!(lp.counters().skipped_stopped, 1);
        assert_eq!(lp.counters().ticks, 1);
    }

    #[test]
    fn pause_suppresses_frames_without_stopping() {
        let mut lp = RenderLoop::default();
        lp.dispatch();
        assert!(lp.admit(&tick(0), true).is_ok());

        lp.set_paused(true);
        assert_eq!(lp.admit(&tick(1), true), Err(SkipReason::Paused));
        assert_eq!(lp.admit(&tick(2), true), Err(SkipReason::Paused));
        assert!(lp.is_running(), "pausing keeps the loop running");

        lp.set_paused(false);
        let admitted = lp.admit(&tick(3), true).unwrap();
        assert_eq!(admitted.frame_index, 1);
        assert_eq!(
            admitted.previous_frame_time, None,
            "delta restarts after a pause"
        );
        assert_eq!(lp.counters().skipped_paused, 2);
    }

    #[test]
    fn detached_view_skips_frames() {
        let mut lp = RenderLoop::default();
        lp.dispatch();
        assert_eq!(lp.admit(&tick(0), false), Err(SkipReason::Detached));
        assert!(lp.admit(&tick(1), true).is_ok());
    }

    #[test]
    fn interval_gates_admission() {
        let mut lp = RenderLoop::new(2, false);
        lp.dispatch();
        let results: [bool; 6] = core::array::from_fn(|i| lp.admit(&tick(i as u64), true).is_ok());
        assert_eq!(results, [true, false, true, false, true, false]);
        assert_eq!(lp.counters().skipped_interval, 3);
        assert_eq!(lp.counters().frames_drawn, 3);
    }

    #[test]
    fn interval_round_trips_unchanged() {
        let mut lp = RenderLoop::default();
        for value in [0, 1, 2, 7, u64::MAX] {
            lp.set_interval(value);
            assert_eq!(lp.interval(), value);
        }
    }

    #[test]
    fn admitted_frame_carries_previous_frame_time() {
        let mut lp = RenderLoop::default();
        lp.dispatch();
        let first = lp.admit(&tick(0), true).unwrap();
        assert_eq!(first.previous_frame_time, None);
        let second = lp.admit(&tick(1), true).unwrap();
        assert_eq!(second.previous_frame_time, Some(HostTime(1_000)));
    }

    #[test]
    fn redispatch_restarts_gate() {
        let mut lp = RenderLoop::new(3, false);
        lp.dispatch();
        assert!(lp.admit(&tick(0), true).is_ok());
        lp.stop();
        lp.dispatch();
        assert!(
            lp.admit(&tick(1), true).is_ok(),
            "first tick after dispatch is admitted"
        );
    }

    #[test]
    fn finish_frame_updates_counters() {
        let mut lp = RenderLoop::default();
        lp.finish_frame(true, false, false);
        lp.finish_frame(false, true, false);
        lp.finish_frame(false, false, true);
        let c = lp.counters();
        assert_eq!(c.frames_presented, 1);
        assert_eq!(c.drawable_unavailable, 1);
        assert_eq!(c.drawables_released, 1);
    }
}
