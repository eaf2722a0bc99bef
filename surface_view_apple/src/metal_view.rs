// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `MetalView`: a native view with a `CAMetalLayer` and a display-linked
//! render loop.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use core::fmt;

use objc2::rc::Retained;
use objc2::{MainThreadMarker, Message};
use objc2_quartz_core::CAMetalLayer;
use surface_view_core::backend::{PlatformView, RefreshDriver};
use surface_view_core::config::ViewConfig;
use surface_view_core::drawable::DrawableSource;
use surface_view_core::frame::RenderDelegate;
use surface_view_core::render_loop::{FrameCounters, LoopState};
use surface_view_core::timing::VsyncTick;
use surface_view_core::trace::{TraceSink, Tracer};
use surface_view_core::view::RenderSurfaceView;

use crate::ca_display_link::DisplayLink;
use crate::cametal::{MetalDrawable, MetalLayerSource};
use crate::host_view::{HostView, NativeView};

/// Errors from [`MetalView`] construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetalViewError {
    /// The system has no Metal device.
    NoMetalDevice,
    /// The host view has no backing layer to attach the Metal layer to.
    NoBackingLayer,
}

impl fmt::Display for MetalViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMetalDevice => f.write_str("no Metal device available"),
            Self::NoBackingLayer => f.write_str("host view has no backing layer"),
        }
    }
}

impl core::error::Error for MetalViewError {}

/// The render-surface view driven by [`MetalView`].
pub type MetalSurface = RenderSurfaceView<HostView, MetalLayerSource, DisplayLink>;

/// View settings readable and writable while a tick holds the surface.
///
/// Writes land here first; [`apply`](Self::apply) pushes them into the
/// surface and copies its state back.
#[derive(Debug)]
struct Settings {
    interval: Cell<u64>,
    paused: Cell<bool>,
    state: Cell<LoopState>,
    requested_state: Cell<Option<LoopState>>,
    counters: Cell<FrameCounters>,
}

impl Settings {
    fn from_surface<V, S, R>(surface: &RenderSurfaceView<V, S, R>) -> Self
    where
        V: PlatformView,
        S: DrawableSource,
        R: RefreshDriver,
    {
        Self {
            interval: Cell::new(surface.interval()),
            paused: Cell::new(surface.is_paused()),
            state: Cell::new(surface.loop_state()),
            requested_state: Cell::new(None),
            counters: Cell::new(*surface.counters()),
        }
    }

    fn apply<V, S, R>(&self, surface: &mut RenderSurfaceView<V, S, R>)
    where
        V: PlatformView,
        S: DrawableSource,
        R: RefreshDriver<Error = Infallible>,
    {
        surface.set_interval(self.interval.get());
        surface.set_paused(self.paused.get());
        match self.requested_state.take() {
            Some(LoopState::Running) => {
                let Ok(()) = surface.dispatch_game_loop();
            }
            Some(LoopState::Stopped) => {
                let Ok(()) = surface.stop_game_loop();
            }
            None => {}
        }
        self.state.set(surface.loop_state());
        self.counters.set(*surface.counters());
    }
}

struct Shared {
    surface: RefCell<MetalSurface>,
    delegate: RefCell<Box<dyn RenderDelegate<MetalLayerSource>>>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
    layer: Retained<CAMetalLayer>,
    native: Retained<NativeView>,
    settings: Settings,
    pending_delegate: Cell<Option<Box<dyn RenderDelegate<MetalLayerSource>>>>,
    pending_sink: Cell<Option<Option<Box<dyn TraceSink>>>>,
}

impl Shared {
    fn on_tick(&self, tick: &VsyncTick) {
        // A tick that arrives while the view is borrowed (a delegate calling
        // back into its own view from a nested run loop) is dropped.
        let (Ok(mut surface), Ok(mut delegate), Ok(mut sink)) = (
            self.surface.try_borrow_mut(),
            self.delegate.try_borrow_mut(),
            self.sink.try_borrow_mut(),
        ) else {
            return;
        };

        // Follow view resizes and backing-scale changes.
        let pixel_size = surface.platform_view().pixel_size();
        surface.source().sync_drawable_size(pixel_size);
        surface.platform_view().fit_layer(surface.source().layer());

        {
            let mut tracer = match sink.as_deref_mut() {
                Some(sink) => Tracer::new(sink),
                None => Tracer::none(),
            };
            surface.on_vsync_traced(tick, &mut **delegate, &mut tracer);
        }

        if let Some(replacement) = self.pending_delegate.take() {
            *delegate = replacement;
        }
        if let Some(replacement) = self.pending_sink.take() {
            *sink = replacement;
        }
        self.settings.apply(&mut surface);
    }

    /// Applies settings now, or after the current tick if one is running.
    fn sync(&self) {
        if let Ok(mut surface) = self.surface.try_borrow_mut() {
            self.settings.apply(&mut surface);
        }
    }
}

/// A native view that owns a `CAMetalLayer` and a pausable render loop
/// driven by `CADisplayLink`.
///
/// The delegate is called on the main thread once per admitted refresh. The
/// display link holds only a weak reference, so dropping the `MetalView`
/// stops the loop.
///
/// The delegate may call back into its own view. Settings changed from inside
/// the delegate (interval, paused, dispatch and stop) take effect when it
/// returns, and [`current_drawable`](Self::current_drawable) returns `None`
/// there; use the frame's drawable instead.
///
/// # Example
///
/// ```ignore
/// let view = MetalView::new(
///     ns_view,
///     |frame: &mut Frame<'_, MetalLayerSource>| {
///         if let Some(drawable) = frame.current_drawable() {
///             encode(drawable.as_raw());
///             frame.present();
///         }
///     },
///     ViewConfig::every_vsync(),
///     mtm,
/// )?;
/// view.dispatch_game_loop();
/// ```
pub struct MetalView {
    shared: Rc<Shared>,
}

impl fmt::Debug for MetalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetalView")
            .field("state", &self.shared.settings.state.get())
            .field("interval", &self.shared.settings.interval.get())
            .field("paused", &self.shared.settings.paused.get())
            .finish_non_exhaustive()
    }
}

impl MetalView {
    /// Attaches a Metal layer backed by the system default device to `view`
    /// and prepares a stopped render loop.
    ///
    /// # Errors
    ///
    /// Returns [`MetalViewError::NoMetalDevice`] without a Metal device, and
    /// [`MetalViewError::NoBackingLayer`] if the view cannot be layer-backed.
    pub fn new<D>(
        view: Retained<NativeView>,
        delegate: D,
        config: ViewConfig,
        mtm: MainThreadMarker,
    ) -> Result<Self, MetalViewError>
    where
        D: RenderDelegate<MetalLayerSource> + 'static,
    {
        let source = MetalLayerSource::with_default_device()?;
        Self::with_source(view, source, delegate, config, mtm)
    }

    /// Like [`new`](Self::new), with a caller-configured layer.
    ///
    /// # Errors
    ///
    /// Returns [`MetalViewError::NoBackingLayer`] if the view cannot be
    /// layer-backed.
    pub fn with_source<D>(
        view: Retained<NativeView>,
        source: MetalLayerSource,
        delegate: D,
        config: ViewConfig,
        mtm: MainThreadMarker,
    ) -> Result<Self, MetalViewError>
    where
        D: RenderDelegate<MetalLayerSource> + 'static,
    {
        let host = HostView::new(view.clone());
        host.attach_layer(source.layer())?;
        source.sync_drawable_size(host.pixel_size());
        let layer = source.layer().retain();

        let delegate: Box<dyn RenderDelegate<MetalLayerSource>> = Box::new(delegate);
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let link = DisplayLink::new(
                move |tick| {
                    if let Some(shared) = weak.upgrade() {
                        shared.on_tick(&tick);
                    }
                },
                config.display,
                mtm,
            );
            let surface = RenderSurfaceView::new(host, source, link, config);
            Shared {
                settings: Settings::from_surface(&surface),
                pending_delegate: Cell::new(None),
                pending_sink: Cell::new(None),
                surface: RefCell::new(surface),
                delegate: RefCell::new(delegate),
                sink: RefCell::new(None),
                layer,
                native: view,
            }
        });
        Ok(Self { shared })
    }

    /// Starts the display-linked render loop. No-op if already running.
    pub fn dispatch_game_loop(&self) {
        self.shared.settings.requested_state.set(Some(LoopState::Running));
        self.shared.sync();
    }

    /// Stops the render loop and releases any held drawable. No-op if
    /// already stopped.
    pub fn stop_game_loop(&self) {
        self.shared.settings.requested_state.set(Some(LoopState::Stopped));
        self.shared.sync();
    }

    /// Returns the drawable for the upcoming frame, or `None` if the layer
    /// cannot produce one right now or a frame is being drawn.
    pub fn current_drawable(&self) -> Option<MetalDrawable> {
        let mut surface = self.shared.surface.try_borrow_mut().ok()?;
        surface.current_drawable().cloned()
    }

    /// Returns the number of refreshes between presentations.
    #[must_use]
    pub fn interval(&self) -> u64 {
        self.shared.settings.interval.get()
    }

    /// Sets the number of refreshes between presentations.
    pub fn set_interval(&self, interval: u64) {
        self.shared.settings.interval.set(interval);
        self.shared.sync();
    }

    /// Returns whether frame advancement is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.settings.paused.get()
    }

    /// Pauses or resumes frame advancement. The display link keeps running.
    pub fn set_paused(&self, paused: bool) {
        self.shared.settings.paused.set(paused);
        self.shared.sync();
    }

    /// Returns whether the loop is running.
    ///
    /// Inside the delegate this reflects the state before the delegate was
    /// called.
    #[must_use]
    pub fn loop_state(&self) -> LoopState {
        self.shared.settings.state.get()
    }

    /// Returns the loop's running totals as of the last completed tick.
    #[must_use]
    pub fn counters(&self) -> FrameCounters {
        self.shared.settings.counters.get()
    }

    /// Returns the `CAMetalLayer`.
    #[must_use]
    pub fn layer(&self) -> Retained<CAMetalLayer> {
        self.shared.layer.clone()
    }

    /// Returns the host view.
    #[must_use]
    pub fn native_view(&self) -> Retained<NativeView> {
        self.shared.native.clone()
    }

    /// Replaces the render delegate.
    ///
    /// Called from inside the delegate, the replacement draws from the next
    /// frame on.
    pub fn set_delegate<D>(&self, delegate: D)
    where
        D: RenderDelegate<MetalLayerSource> + 'static,
    {
        let delegate: Box<dyn RenderDelegate<MetalLayerSource>> = Box::new(delegate);
        match self.shared.delegate.try_borrow_mut() {
            Ok(mut current) => *current = delegate,
            Err(_) => self.shared.pending_delegate.set(Some(delegate)),
        }
    }

    /// Routes render-loop trace events to `sink`, or stops tracing with
    /// `None`.
    ///
    /// Events are only emitted when `surface_view_core` is built with the
    /// `trace` feature. Called from inside the delegate, the change applies
    /// once the current frame's events are emitted.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) {
        match self.shared.sink.try_borrow_mut() {
            Ok(mut current) => *current = sink,
            Err(_) => self.shared.pending_sink.set(Some(sink)),
        }
    }
}
