// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Apple backend for `surface_view`.
//!
//! Building blocks for rendering into a native view on Apple platforms
//! (macOS, iOS, tvOS):
//!
//! - [`DisplayLink`]: `CADisplayLink` refresh driver
//! - [`MetalLayerSource`] / [`MetalDrawable`]: `CAMetalLayer` drawables
//! - [`HostView`]: `NSView` (`appkit` feature) or `UIView` (`uikit` feature)
//! - [`MetalView`]: all of the above wired to a
//!   [`RenderSurfaceView`](surface_view_core::view::RenderSurfaceView)
//!
//! Everything here is main-thread only.

#![no_std]
#![expect(
    unsafe_code,
    reason = "Apple backend requires Objective-C and Mach FFI"
)]

extern crate alloc;

mod ca_display_link;
mod cametal;
mod host_view;
mod mach_time;
mod metal_view;

pub use ca_display_link::DisplayLink;
pub use cametal::{MetalDrawable, MetalLayerSource};
pub use host_view::{HostView, NativeView};
pub use metal_view::{MetalSurface, MetalView, MetalViewError};

use surface_view_core::time::{HostTime, Timebase};

/// Returns the current host time (Mach absolute time).
#[must_use]
pub fn now() -> HostTime {
    mach_time::now()
}

/// Returns the Mach absolute time [`Timebase`].
#[must_use]
pub fn timebase() -> Timebase {
    mach_time::timebase()
}
