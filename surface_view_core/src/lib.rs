// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A render-surface view with a vsync-driven, pausable render loop.
//!
//! `surface_view_core` holds the platform-independent half of a view that
//! owns a GPU-presentable layer. It is `no_std` compatible (with `alloc`) and
//! does no I/O of its own: backends deliver refresh ticks, hand out drawables,
//! and describe the host view.
//!
//! # Architecture
//!
//! ```text
//!   RefreshDriver (CADisplayLink, simulated display, ...)
//!       │ VsyncTick
//!       ▼
//!   RenderSurfaceView::on_vsync()
//!       │  RenderLoop: stopped? paused? detached? interval?
//!       ▼
//!   RenderDelegate::draw(&mut Frame)
//!       │  frame.current_drawable() ──► DrawableSource::next_drawable()
//!       │  frame.present()          ──► Drawable::present()
//!       ▼
//!   DrawableSlot released back to the layer
//! ```
//!
//! **[`view`]**: [`RenderSurfaceView`](view::RenderSurfaceView), the
//! component applications hold: drawable accessor, interval, paused flag,
//! and `dispatch_game_loop` / `stop_game_loop`.
//!
//! **[`render_loop`]**: The `{Stopped, Running} × {Paused, Active}` state
//! machine and per-tick admission.
//!
//! **[`interval`]**: Presentation-interval gating.
//!
//! **[`drawable`]**: [`Drawable`](drawable::Drawable) and
//! [`DrawableSource`](drawable::DrawableSource) traits and the single-slot
//! holder that borrows a drawable for one frame.
//!
//! **[`frame`]**: The per-frame context handed to render delegates.
//!
//! **[`backend`]**: The [`PlatformView`](backend::PlatformView) and
//! [`RefreshDriver`](backend::RefreshDriver) traits backends implement.
//!
//! **[`timing`]** / **[`time`]**: Vsync ticks, host time and timebases.
//!
//! **[`config`]**: Initial view settings.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! render-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod drawable;
pub mod frame;
pub mod interval;
pub mod render_loop;
pub mod time;
pub mod timing;
pub mod trace;
pub mod view;
