// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless host view.

use kurbo::Size;
use surface_view_core::backend::PlatformView;

/// A [`PlatformView`] with no window system behind it.
///
/// Bounds, scale and attachment are plain fields set by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessView {
    /// Bounds size in points.
    pub bounds: Size,
    /// Pixels per point.
    pub scale: f64,
    /// Whether the view counts as placed in a window.
    pub attached: bool,
}

impl HeadlessView {
    /// Creates an attached view at scale 1.
    #[must_use]
    pub const fn new(bounds: Size) -> Self {
        Self {
            bounds,
            scale: 1.0,
            attached: true,
        }
    }

    /// Returns this view with a different scale factor.
    #[must_use]
    pub const fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }
}

impl PlatformView for HeadlessView {
    fn bounds_size(&self) -> Size {
        self.bounds
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
