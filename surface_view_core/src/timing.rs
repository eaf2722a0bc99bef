// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Refresh-signal ticks delivered by backends.
//!
//! A [`VsyncTick`] is produced for every callback of the platform's display
//! refresh mechanism (`CADisplayLink`, a simulated display, ...). Not every
//! platform knows when pixels will actually reach the screen, so the
//! predictive fields are optional and [`TimingConfidence`] says how far they
//! can be trusted.

use core::fmt;

use crate::time::{Duration, HostTime};

/// Identifies a display or output surface.
///
/// Backends assign these; core passes them through without interpreting the
/// value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayId(pub u32);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// How reliable the predicted present time of a tick is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimingConfidence {
    /// The platform predicts the present time (e.g. `CADisplayLink`).
    Predictive,
    /// Vsync-aligned but loosely predicted.
    Estimated,
    /// Pacing only; no present-time prediction.
    PacingOnly,
}

/// One callback of the display refresh signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VsyncTick {
    /// Host time when the callback ran.
    pub now: HostTime,
    /// When the frame drawn for this tick is expected on screen, if known.
    pub target_present: Option<HostTime>,
    /// Display refresh interval, if known.
    pub refresh_interval: Option<Duration>,
    /// Confidence level for the timing fields.
    pub confidence: TimingConfidence,
    /// Monotonically increasing per-driver tick counter.
    pub tick_index: u64,
    /// Which display produced this tick.
    pub display: DisplayId,
    /// Actual present time of the previous refresh, if the backend reports it.
    pub prev_actual_present: Option<HostTime>,
}

impl VsyncTick {
    /// Returns the time the frame for this tick represents: the target present
    /// time when the backend predicts one, otherwise `now`.
    #[inline]
    #[must_use]
    pub fn frame_time(&self) -> HostTime {
        match self.confidence {
            TimingConfidence::Predictive | TimingConfidence::Estimated => {
                self.target_present.unwrap_or(self.now)
            }
            TimingConfidence::PacingOnly => self.now,
        }
    }

    /// Returns the time between presentations when one frame is drawn every
    /// `interval` refreshes, if the refresh interval is known.
    ///
    /// An interval of zero is treated as one.
    #[inline]
    #[must_use]
    pub fn presentation_period(&self, interval: u64) -> Option<Duration> {
        self.refresh_interval
            .map(|refresh| refresh.saturating_mul(interval.max(1)))
    }
}
