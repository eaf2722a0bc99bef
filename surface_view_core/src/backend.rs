// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Platform work lives in *backend* crates. Each backend provides:
//!
//! - **Host view**: Implements [`PlatformView`] over the platform's base view
//!   type (`NSView`, `UIView`, a headless stand-in). Which implementation is
//!   used is decided at build time by target and cargo features, not by
//!   subclassing.
//!
//! - **Refresh driver**: Implements [`RefreshDriver`] to start and stop the
//!   platform's display refresh callbacks and to read its monotonic clock.
//!   The driver's callback delivers [`VsyncTick`]s; how they reach
//!   [`RenderSurfaceView::on_vsync`] is backend-specific because callback
//!   registration and lifetimes differ fundamentally across platforms.
//!
//! - **Layer**: Implements [`DrawableSource`] for the GPU-compositable layer
//!   (`CAMetalLayer`, an offscreen pool).
//!
//! # Crate boundaries
//!
//! `surface_view_core` owns the loop state machine, drawable slot, and this
//! contract module. Backend crates depend on it and provide platform glue.
//!
//! [`VsyncTick`]: crate::timing::VsyncTick
//! [`RenderSurfaceView::on_vsync`]: crate::view::RenderSurfaceView::on_vsync
//! [`DrawableSource`]: crate::drawable::DrawableSource

use kurbo::Size;

use crate::time::{HostTime, Timebase};

/// Capabilities the render surface needs from its host view.
pub trait PlatformView {
    /// Returns the view's bounds size in points.
    fn bounds_size(&self) -> Size;

    /// Returns the number of pixels per point.
    fn scale_factor(&self) -> f64;

    /// Returns `true` while the view is placed in a window.
    ///
    /// Frames are not drawn while this is `false`.
    fn is_attached(&self) -> bool;

    /// Returns the backing size in pixels (`bounds_size * scale_factor`).
    fn pixel_size(&self) -> Size {
        let scale = self.scale_factor();
        let bounds = self.bounds_size();
        Size::new(bounds.width * scale, bounds.height * scale)
    }
}

/// Starts and stops the platform's display refresh callbacks.
pub trait RefreshDriver {
    /// Error reported when the platform refuses to start or stop callbacks.
    type Error: core::error::Error;

    /// Begins delivering refresh ticks.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot schedule callbacks.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Stops delivering refresh ticks.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform reports a failure while stopping.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Returns the current host time on the driver's clock.
    fn now(&self) -> HostTime;

    /// Returns the timebase of the driver's clock.
    fn timebase(&self) -> Timebase;
}
