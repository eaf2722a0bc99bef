// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Initial settings for a [`RenderSurfaceView`](crate::view::RenderSurfaceView).

use crate::timing::DisplayId;

/// Initial settings for a render surface view.
///
/// Every field can be changed later through the view's setters; this only
/// decides the state the view starts in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Refresh ticks between presentations.
    pub interval: u64,
    /// Whether the loop starts paused.
    pub start_paused: bool,
    /// Display whose refresh signal drives the loop.
    pub display: DisplayId,
}

impl ViewConfig {
    /// Draws on every refresh of the main display.
    #[must_use]
    pub const fn every_vsync() -> Self {
        Self {
            interval: 1,
            start_paused: false,
            display: DisplayId(0),
        }
    }

    /// Draws on every other refresh (30 fps on a 60 Hz display).
    #[must_use]
    pub const fn half_rate() -> Self {
        Self {
            interval: 2,
            ..Self::every_vsync()
        }
    }

    /// Returns this configuration with a different interval.
    #[must_use]
    pub const fn with_interval(self, interval: u64) -> Self {
        Self { interval, ..self }
    }

    /// Returns this configuration starting paused or not.
    #[must_use]
    pub const fn with_start_paused(self, start_paused: bool) -> Self {
        Self {
            start_paused,
            ..self
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::every_vsync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(ViewConfig::default(), ViewConfig::every_vsync());
        assert_eq!(ViewConfig::half_rate().interval, 2);
        assert!(!ViewConfig::half_rate().start_paused);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = ViewConfig::every_vsync()
            .with_interval(4)
            .with_start_paused(true);
        assert_eq!(config.interval, 4);
        assert!(config.start_paused);
        assert_eq!(config.display, DisplayId(0));
    }
}
