// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `CAMetalLayer` drawable source.
//!
//! [`MetalLayerSource`] owns the view's `CAMetalLayer` and hands out
//! [`MetalDrawable`]s from it. The layer keeps a small pool of drawables
//! (three by default); `nextDrawable` returns nil when the layer has no
//! device or a zero drawable size, or when the pool stays exhausted past
//! the layer's timeout.

use core::ffi::c_void;
use core::fmt;

use kurbo::Size;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_core_foundation::CGSize;
use objc2_metal::{MTLCreateSystemDefaultDevice, MTLDevice, MTLDrawable};
use objc2_quartz_core::{CAMetalDrawable, CAMetalLayer};
use surface_view_core::drawable::{Drawable, DrawableSource};

use crate::MetalViewError;

/// A drawable from a `CAMetalLayer`.
///
/// Cloning retains the same underlying `CAMetalDrawable`.
#[derive(Clone)]
pub struct MetalDrawable {
    raw: Retained<ProtocolObject<dyn CAMetalDrawable>>,
}

impl fmt::Debug for MetalDrawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetalDrawable").finish_non_exhaustive()
    }
}

impl MetalDrawable {
    /// Returns the underlying `CAMetalDrawable`, for encoding GPU work into
    /// its texture.
    #[must_use]
    pub fn as_raw(&self) -> &ProtocolObject<dyn CAMetalDrawable> {
        &self.raw
    }
}

impl Drawable for MetalDrawable {
    fn present(&self) {
        self.raw.present();
    }
}

/// Owns a `CAMetalLayer` and produces [`MetalDrawable`]s from it.
///
/// Two usage modes are supported:
///
/// - **Native Metal**: take drawables through
///   [`RenderSurfaceView::current_drawable`](surface_view_core::view::RenderSurfaceView::current_drawable)
///   or the frame passed to the render delegate.
/// - **External renderer**: call [`as_raw_layer`](Self::as_raw_layer) to get
///   a pointer for wgpu's `create_surface_from_layer()` or similar.
pub struct MetalLayerSource {
    layer: Retained<CAMetalLayer>,
}

impl fmt::Debug for MetalLayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetalLayerSource")
            .field("drawable_size", &self.drawable_size())
            .finish_non_exhaustive()
    }
}

impl MetalLayerSource {
    /// Creates a layer backed by the system default Metal device.
    ///
    /// # Errors
    ///
    /// Returns [`MetalViewError::NoMetalDevice`] if the system has no Metal
    /// device.
    pub fn with_default_device() -> Result<Self, MetalViewError> {
        let device = MTLCreateSystemDefaultDevice().ok_or(MetalViewError::NoMetalDevice)?;
        Ok(Self::with_device(&device))
    }

    /// Creates a layer that renders with `device`.
    #[must_use]
    pub fn with_device(device: &ProtocolObject<dyn MTLDevice>) -> Self {
        let layer = CAMetalLayer::new();
        // SAFETY: `device` is a live MTLDevice; the layer retains it.
        unsafe { layer.setDevice(Some(device)) };
        Self { layer }
    }

    /// Wraps an existing, configured layer.
    #[must_use]
    pub fn from_layer(layer: Retained<CAMetalLayer>) -> Self {
        Self { layer }
    }

    /// Returns the underlying `CAMetalLayer` for configuration (pixel format,
    /// colorspace, `maximumDrawableCount`, ...).
    #[must_use]
    pub fn layer(&self) -> &CAMetalLayer {
        &self.layer
    }

    /// Returns the layer's Metal device, if one is set.
    #[must_use]
    pub fn device(&self) -> Option<Retained<ProtocolObject<dyn MTLDevice>>> {
        self.layer.device()
    }

    /// Sets the pixel size of subsequently produced drawables.
    pub fn set_drawable_size(&self, size: Size) {
        self.layer.setDrawableSize(CGSize::new(size.width, size.height));
    }

    /// Updates the drawable size if it differs from `size`.
    ///
    /// Returns `true` if the size changed.
    pub fn sync_drawable_size(&self, size: Size) -> bool {
        if self.drawable_size() == size {
            return false;
        }
        self.set_drawable_size(size);
        true
    }

    /// Returns a raw pointer to the `CAMetalLayer` for use with external
    /// renderers.
    ///
    /// The pointer is valid for the lifetime of this source.
    #[must_use]
    pub fn as_raw_layer(&self) -> *mut c_void {
        let ptr: *const CAMetalLayer = &*self.layer;
        ptr as *mut c_void
    }
}

impl DrawableSource for MetalLayerSource {
    type Drawable = MetalDrawable;

    fn next_drawable(&mut self) -> Option<MetalDrawable> {
        // SAFETY: called on the thread that owns the layer; the returned
        // drawable is retained independently of the layer.
        unsafe { self.layer.nextDrawable() }.map(|raw| MetalDrawable { raw })
    }

    fn drawable_size(&self) -> Size {
        let size = self.layer.drawableSize();
        Size::new(size.width, size.height)
    }
}
