// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation-interval gating.
//!
//! The presentation interval is the number of refresh ticks between
//! successive frames. [`IntervalGate`] turns that number into a per-tick
//! admit/skip decision.

/// Admits one refresh tick out of every `interval`.
///
/// The gate counts the ticks still to be skipped before the next admitted
/// one. A fresh (or [reset](Self::reset)) gate admits the next tick
/// immediately. An interval of zero behaves like one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntervalGate {
    pending_skips: u64,
}

impl IntervalGate {
    /// Creates a gate that admits the next tick.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending_skips: 0 }
    }

    /// Decides whether the current tick is drawn.
    ///
    /// Returns `true` for an admitted tick, after which the following
    /// `max(interval, 1) - 1` calls return `false`.
    pub fn admit(&mut self, interval: u64) -> bool {
        if self.pending_skips == 0 {
            self.pending_skips = effective(interval) - 1;
            true
        } else {
            self.pending_skips -= 1;
            false
        }
    }

    /// Makes the next tick admitted regardless of the interval.
    pub fn reset(&mut self) {
        self.pending_skips = 0;
    }

    /// Shortens the pending wait when the interval drops below it.
    pub fn clamp_to(&mut self, interval: u64) {
        self.pending_skips = self.pending_skips.min(effective(interval) - 1);
    }

    /// Returns how many ticks will be skipped before the next admitted one.
    #[must_use]
    pub const fn pending_skips(&self) -> u64 {
        self.pending_skips
    }
}

const fn effective(interval: u64) -> u64 {
    if interval == 0 { 1 } else { interval }
}
