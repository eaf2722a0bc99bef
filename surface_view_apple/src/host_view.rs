// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host view: `NSView` with the `appkit` feature, `UIView` with `uikit`.

use kurbo::Size;
use objc2::rc::Retained;
use objc2_core_foundation::{CGPoint, CGRect};
use objc2_quartz_core::{CALayer, CATransaction};
use surface_view_core::backend::PlatformView;

use crate::MetalViewError;

#[cfg(not(any(feature = "appkit", feature = "uikit")))]
compile_error!("surface_view_apple needs either the `appkit` or the `uikit` feature");

/// The platform view type hosting the Metal layer.
#[cfg(feature = "appkit")]
pub type NativeView = objc2_app_kit::NSView;

/// The platform view type hosting the Metal layer.
#[cfg(all(feature = "uikit", not(feature = "appkit")))]
pub type NativeView = objc2_ui_kit::UIView;

/// A [`PlatformView`] over a native view.
///
/// Attachment follows the view's window; the scale factor is the window's
/// backing scale on AppKit and the view's content scale on UIKit.
#[derive(Debug, Clone)]
pub struct HostView {
    view: Retained<NativeView>,
}

impl HostView {
    /// Wraps `view`.
    #[must_use]
    pub fn new(view: Retained<NativeView>) -> Self {
        Self { view }
    }

    /// Returns the native view.
    #[must_use]
    pub fn native(&self) -> &NativeView {
        &self.view
    }

    /// Returns the view's backing layer, creating it on AppKit.
    fn backing_layer(&self) -> Option<Retained<CALayer>> {
        #[cfg(feature = "appkit")]
        {
            self.view.setWantsLayer(true);
            self.view.layer()
        }
        #[cfg(not(feature = "appkit"))]
        {
            Some(self.view.layer())
        }
    }

    /// Adds `layer` as a sublayer of the view's backing layer and sizes it to
    /// the view.
    pub(crate) fn attach_layer(&self, layer: &CALayer) -> Result<(), MetalViewError> {
        let backing = self.backing_layer().ok_or(MetalViewError::NoBackingLayer)?;
        backing.addSublayer(layer);
        self.fit_layer(layer);
        Ok(())
    }

    /// Matches `layer`'s frame and contents scale to the view, without
    /// implicit animation.
    pub(crate) fn fit_layer(&self, layer: &CALayer) {
        let frame = CGRect::new(CGPoint::new(0.0, 0.0), self.view.bounds().size);
        let scale = self.scale_factor();
        if layer.frame() == frame && layer.contentsScale() == scale {
            return;
        }
        CATransaction::begin();
        CATransaction::setDisableActions(true);
        layer.setFrame(frame);
        layer.setContentsScale(scale);
        CATransaction::commit();
    }
}

impl PlatformView for HostView {
    fn bounds_size(&self) -> Size {
        let size = self.view.bounds().size;
        Size::new(size.width, size.height)
    }

    #[cfg(feature = "appkit")]
    fn scale_factor(&self) -> f64 {
        self.view
            .window()
            .map_or(1.0, |window| window.backingScaleFactor())
    }

    #[cfg(all(feature = "uikit", not(feature = "appkit")))]
    fn scale_factor(&self) -> f64 {
        self.view.contentScaleFactor()
    }

    fn is_attached(&self) -> bool {
        self.view.window().is_some()
    }
}
