// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless paint loop that exercises the compositor and its trace pipeline.
//!
//! Paints a scrolling strip into a window at a fractional device-pixel ratio,
//! flushes parts of it to the window and to a child, then changes the ratio
//! half-way through. Events go to a
//! [`PrettyPrintSink`](backdrop_debug::pretty::PrettyPrintSink) on stdout and
//! a [`RecorderSink`](backdrop_debug::recorder::RecorderSink), which is
//! exported as a Chrome trace at the end.
//!
//! Set `RUST_LOG=debug` for the compositor's own log output and
//! `BACKDROP_HIGHDPI_DOWNSCALE=1` to render at an integer ratio.

use std::cell::RefCell;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use backdrop_core::compositor::{Surface, SurfaceCompositor};
use backdrop_core::config::CompositorConfig;
use backdrop_core::geometry::{PixelPoint, PixelRect, PixelSize, Region};
use backdrop_core::image::{Color, PixelFormat};
use backdrop_core::painter::Painter;
use backdrop_core::trace::{
    BeginPaintEvent, DiagnosticEvent, EndPaintEvent, FlushEvent, ResizeEvent, ScrollEvent,
    TraceSink,
};
use backdrop_core::window::Window;
use backdrop_debug::pretty::PrettyPrintSink;
use backdrop_debug::recorder::RecorderSink;
use backdrop_raster::{HeadlessScreen, HeadlessWindow, RasterSurface};
use kurbo::Rect;
use tracing_subscriber::EnvFilter;

const FRAME_COUNT: u32 = 24;
const WINDOW_SIZE: PixelSize = PixelSize::new(320, 240);
const STRIP_HEIGHT: u32 = 20;

/// Forwards every event to a pretty printer and a shared recorder.
#[derive(Debug)]
struct Tee {
    pretty: PrettyPrintSink,
    recorder: Rc<RefCell<RecorderSink>>,
}

impl TraceSink for Tee {
    fn on_resize(&mut self, e: &ResizeEvent) {
        self.pretty.on_resize(e);
        self.recorder.on_resize(e);
    }

    fn on_begin_paint(&mut self, e: &BeginPaintEvent) {
        self.pretty.on_begin_paint(e);
        self.recorder.on_begin_paint(e);
    }

    fn on_end_paint(&mut self, e: &EndPaintEvent) {
        self.pretty.on_end_paint(e);
        self.recorder.on_end_paint(e);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.pretty.on_flush(e);
        self.recorder.on_flush(e);
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.pretty.on_scroll(e);
        self.recorder.on_scroll(e);
    }

    fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
        self.pretty.on_diagnostic(e);
        self.recorder.on_diagnostic(e);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -- windows -----------------------------------------------------------
    let window = HeadlessWindow::new(WINDOW_SIZE, 1.5);
    let child = window.child(PixelSize::new(100, 100));
    let screen = HeadlessScreen::new();

    // -- compositor --------------------------------------------------------
    let config = CompositorConfig::from_env();
    let blitter = screen.clone();
    let mut compositor = SurfaceCompositor::new(window.clone(), config, move |_: &HeadlessWindow| {
        RasterSurface::new(PixelFormat::Argb32Premultiplied, blitter.clone())
    });

    let recorder = Rc::new(RefCell::new(RecorderSink::new()));
    compositor.set_trace_sink(Box::new(Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: Rc::clone(&recorder),
    }));

    // -- loop --------------------------------------------------------------
    let full = Region::from_rect(PixelRect::new(0, 0, WINDOW_SIZE.width, WINDOW_SIZE.height));
    let strip_top = i32::try_from(WINDOW_SIZE.height - STRIP_HEIGHT)?;
    for frame in 0..FRAME_COUNT {
        if frame == FRAME_COUNT / 2 {
            tracing::info!("moving window to a 2x display");
            window.set_device_pixel_ratio(2.0);
        }

        // Shift everything up and paint the uncovered strip.
        let scrolled = frame > 0 && compositor.scroll(&full, 0, -i32::try_from(STRIP_HEIGHT)?);
        let dirty = if scrolled {
            Region::from_rect(PixelRect::new(0, strip_top, WINDOW_SIZE.width, STRIP_HEIGHT))
        } else {
            full.clone()
        };

        compositor.begin_paint(&dirty);
        if let Surface::Raster(target) = compositor.paint_device() {
            let mut painter = Painter::new(target);
            let shade = u8::try_from(frame * 10 % 256)?;
            painter.fill_rect(
                Rect::new(
                    0.0,
                    f64::from(strip_top),
                    f64::from(WINDOW_SIZE.width),
                    f64::from(WINDOW_SIZE.height),
                ),
                Color::rgb(shade, 128, 255 - shade),
            );
        }
        compositor.end_paint();

        compositor.flush(&dirty, None, PixelPoint::ORIGIN);
        compositor.flush(
            &Region::from_rect(PixelRect::new(10, 10, 50, 50)),
            Some(&child),
            PixelPoint::new(5, 5),
        );
    }

    println!(
        "{} paints, {} blits, native size {:?}",
        compositor.paint_count(),
        screen.blit_count(),
        compositor.native_size(),
    );
    if let Some(fb) = screen.framebuffer(child.id()) {
        println!("child framebuffer {:?}", fb.size());
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "paint_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    backdrop_debug::chrome::export(recorder.borrow().as_bytes(), &mut writer)?;

    println!("Wrote {path} ({FRAME_COUNT} frames)");
    Ok(())
}
