// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless backend for `surface_view`.
//!
//! Runs a [`RenderSurfaceView`] without a window system or GPU, for tests,
//! CI and offline tooling:
//!
//! - [`SimulatedDisplay`] / [`SimulatedDriver`]: virtual refresh signal and
//!   its [`RefreshDriver`](surface_view_core::backend::RefreshDriver)
//! - [`OffscreenLayer`]: bounded pool of [`OffscreenDrawable`]s
//! - [`HeadlessView`]: host view with caller-set bounds and attachment

#![no_std]

extern crate alloc;

mod display;
mod host;
mod offscreen;

pub use display::{DisplayError, SimulatedDisplay, SimulatedDriver};
pub use host::HeadlessView;
pub use offscreen::{OffscreenDrawable, OffscreenLayer};

use surface_view_core::config::ViewConfig;
use surface_view_core::view::RenderSurfaceView;

/// A render surface view wired to the headless backend.
pub type HeadlessSurfaceView = RenderSurfaceView<HeadlessView, OffscreenLayer, SimulatedDriver>;

/// Builds a headless view and the display that drives it.
///
/// The layer's drawables match the view's pixel size.
#[must_use]
pub fn headless_surface(
    view: HeadlessView,
    config: ViewConfig,
) -> (HeadlessSurfaceView, SimulatedDisplay) {
    use surface_view_core::backend::PlatformView as _;

    let display = SimulatedDisplay::sixty_hz(config.display);
    let layer = OffscreenLayer::new(view.pixel_size());
    let surface = RenderSurfaceView::new(view, layer, display.driver(), config);
    (surface, display)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Size;
    use surface_view_core::drawable::{Acquisition, DrawableSource};
    use surface_view_core::frame::Frame;
    use surface_view_core::render_loop::{LoopState, SkipReason};
    use surface_view_core::view::TickOutcome;

    use super::*;

    fn render(frame: &mut Frame<'_, OffscreenLayer>) {
        if frame.current_drawable().is_some() {
            frame.present();
        }
    }

    fn surface(config: ViewConfig) -> (HeadlessSurfaceView, SimulatedDisplay) {
        headless_surface(HeadlessView::new(Size::new(320.0, 200.0)).with_scale(2.0), config)
    }

    /// Advances the display `n` refreshes, feeding any ticks to the view.
    fn pump(
        view: &mut HeadlessSurfaceView,
        display: &SimulatedDisplay,
        n: usize,
    ) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..n {
            if let Some(tick) = display.advance() {
                outcomes.push(view.on_vsync(&tick, &mut render));
            }
        }
        outcomes
    }

    #[test]
    fn drawables_match_pixel_size() {
        let (view, _display) = surface(ViewConfig::default());
        assert_eq!(view.source().drawable_size(), Size::new(640.0, 400.0));
    }

    #[test]
    fn no_ticks_before_dispatch() {
        let (mut view, display) = surface(ViewConfig::default());
        assert!(pump(&mut view, &display, 5).is_empty());
        assert_eq!(view.loop_state(), LoopState::Stopped);
    }

    #[test]
    fn dispatch_starts_display_and_stop_halts_it() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        assert!(display.is_running());
        assert_eq!(pump(&mut view, &display, 4).len(), 4);

        view.stop_game_loop().unwrap();
        assert!(!display.is_running());
        assert!(pump(&mut view, &display, 4).is_empty());
        assert_eq!(view.source().presented_count(), 4);
    }

    #[test]
    fn stopping_a_stopped_view_returns_its_drawable() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        pump(&mut view, &display, 1);
        view.stop_game_loop().unwrap();

        assert!(view.current_drawable().is_some());
        assert_eq!(view.source().in_flight(), 1);
        view.stop_game_loop().unwrap();
        assert_eq!(view.source().in_flight(), 0, "drawable pinned after stop");
    }

    #[test]
    fn dispatch_on_disconnected_display_fails() {
        let (mut view, display) = surface(ViewConfig::default());
        display.disconnect();
        assert_eq!(
            view.dispatch_game_loop(),
            Err(DisplayError::Disconnected(display.id()))
        );
        assert_eq!(view.loop_state(), LoopState::Stopped);
    }

    #[test]
    fn pause_keeps_display_running() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.set_paused(true);

        let outcomes = pump(&mut view, &display, 3);
        assert_eq!(outcomes, [TickOutcome::Skipped(SkipReason::Paused); 3]);
        assert!(display.is_running(), "paused loop still receives ticks");
        assert_eq!(view.source().presented_count(), 0);

        view.set_paused(false);
        let outcomes = pump(&mut view, &display, 1);
        assert!(outcomes[0].is_drawn());
        assert_eq!(view.source().presented_count(), 1);
    }

    #[test]
    fn half_rate_presents_every_other_refresh() {
        let (mut view, display) = surface(ViewConfig::half_rate());
        view.dispatch_game_loop().unwrap();
        pump(&mut view, &display, 10);
        assert_eq!(view.source().presented_count(), 5);
        assert_eq!(view.counters().skipped_interval, 5);
    }

    #[test]
    fn exhausted_pool_yields_absent_drawable() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();

        // Hold every drawable outside the view.
        let held: Vec<_> = (0..OffscreenLayer::DEFAULT_MAX_IN_FLIGHT)
            .filter_map(|_| view.source_mut().next_drawable())
            .collect();
        assert!(view.current_drawable().is_none());

        let outcomes = pump(&mut view, &display, 1);
        let TickOutcome::Drawn(report) = outcomes[0] else {
            panic!("expected a drawn frame, got {:?}", outcomes[0]);
        };
        assert_eq!(report.acquisition, Acquisition::Unavailable);
        assert!(!report.presented);

        drop(held);
        assert!(view.current_drawable().is_some());
    }

    #[test]
    fn detaching_host_view_skips_frames() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        view.platform_view_mut().attached = false;
        assert_eq!(
            pump(&mut view, &display, 2),
            [TickOutcome::Skipped(SkipReason::Detached); 2]
        );
    }

    #[test]
    fn drawables_are_returned_to_pool_each_frame() {
        let (mut view, display) = surface(ViewConfig::default());
        view.dispatch_game_loop().unwrap();
        pump(&mut view, &display, 10);
        assert_eq!(view.source().in_flight(), 0);
        assert_eq!(view.source().presented_count(), 10);
    }

    #[test]
    fn frame_delta_tracks_refresh_interval() {
        let (mut view, display) = surface(ViewConfig::half_rate());
        view.dispatch_game_loop().unwrap();

        let mut deltas = Vec::new();
        for _ in 0..5 {
            if let Some(tick) = display.advance() {
                view.on_vsync(&tick, &mut |frame: &mut Frame<'_, OffscreenLayer>| {
                    deltas.push(frame.delta());
                });
            }
        }
        let period = SimulatedDisplay::SIXTY_HZ.saturating_mul(2);
        assert_eq!(deltas, [None, Some(period), Some(period)]);
    }
}
