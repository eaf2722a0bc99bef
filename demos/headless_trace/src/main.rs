// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless render loop that exercises the tracing and diagnostics pipeline.
//!
//! Drives a [`HeadlessSurfaceView`](surface_view_headless::HeadlessSurfaceView)
//! from a simulated 60 Hz display for two seconds, changing the presentation
//! interval, pausing, and detaching the view along the way. Events go to both
//! a [`PrettyPrintSink`] and a [`RecorderSink`], and the recording is exported
//! as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use kurbo::Size;
use surface_view_core::config::ViewConfig;
use surface_view_core::frame::Frame;
use surface_view_core::time::{Duration, Timebase};
use surface_view_core::trace::Tracer;
use surface_view_debug::pretty::PrettyPrintSink;
use surface_view_debug::recorder::RecorderSink;
use surface_view_debug::tee::Tee;
use surface_view_headless::{HeadlessView, OffscreenLayer, headless_surface};

const REFRESH_COUNT: u64 = 120;
/// Simulated encode time per frame.
const DRAW_COST: Duration = Duration(2_000_000);

fn main() {
    let timebase = Timebase::NANOS;

    // -- sinks -------------------------------------------------------------
    let mut sink = Tee::new(
        PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        RecorderSink::new(),
    );

    // -- view --------------------------------------------------------------
    let host = HeadlessView::new(Size::new(400.0, 300.0)).with_scale(2.0);
    let (mut view, display) = headless_surface(host, ViewConfig::every_vsync());
    view.dispatch_game_loop().expect("simulated display is connected");

    let mut draw = |frame: &mut Frame<'_, OffscreenLayer>| {
        if frame.current_drawable().is_some() {
            display.advance_by(DRAW_COST);
            frame.present();
        }
    };

    // -- simulated loop ----------------------------------------------------
    let mut tracer = Tracer::new(&mut sink);
    for refresh in 0..REFRESH_COUNT {
        match refresh {
            30 => view.set_interval(2),
            60 => view.set_paused(true),
            75 => view.set_paused(false),
            90 => view.platform_view_mut().attached = false,
            95 => view.platform_view_mut().attached = true,
            _ => {}
        }
        if let Some(tick) = display.advance() {
            view.on_vsync_traced(&tick, &mut draw, &mut tracer);
        }
    }
    drop(tracer);

    view.stop_game_loop().expect("stopping a simulated display cannot fail");

    let counters = *view.counters();
    println!(
        "ticks={} drawn={} presented={} skipped: paused={} detached={} interval={}",
        counters.ticks,
        counters.frames_drawn,
        counters.frames_presented,
        counters.skipped_paused,
        counters.skipped_detached,
        counters.skipped_interval,
    );

    // -- export Chrome trace -----------------------------------------------
    let (_, recorder) = sink.into_inner();
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    surface_view_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({REFRESH_COUNT} refreshes)");
}
