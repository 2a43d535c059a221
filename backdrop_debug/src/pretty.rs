// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::fmt;
use std::io::Write;

use backdrop_core::geometry::{PixelPoint, PixelRect, PixelSize};
use backdrop_core::trace::{
    BeginPaintEvent, DiagnosticEvent, EndPaintEvent, FlushEvent, ResizeEvent, ScrollEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

struct Size(PixelSize);

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0.width, self.0.height)
    }
}

struct Point(PixelPoint);

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.0.x, self.0.y)
    }
}

struct Rect(PixelRect);

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(f, "{}x{}+{}+{}", r.width, r.height, r.x, r.y)
    }
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_resize(&mut self, e: &ResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] window={} logical={} native={} realloc={}",
            e.window.0,
            Size(e.logical_size),
            Size(e.native_size),
            yes_no(e.reallocated),
        );
    }

    fn on_begin_paint(&mut self, e: &BeginPaintEvent) {
        let _ = writeln!(
            self.writer,
            "[begin] paint={} window={} bounds={} dpr={} view={}",
            e.paint_index,
            e.window.0,
            Rect(e.native_bounds),
            e.device_pixel_ratio,
            if e.view_rebuilt { "rebuilt" } else { "kept" },
        );
    }

    fn on_end_paint(&mut self, e: &EndPaintEvent) {
        let _ = writeln!(
            self.writer,
            "[end] paint={} window={}",
            e.paint_index, e.window.0,
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        let _ = writeln!(
            self.writer,
            "[flush] window={} bounds={} offset={} correction={}",
            e.window.0,
            Rect(e.native_bounds),
            Point(e.native_offset),
            Point(e.correction),
        );
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        let _ = writeln!(
            self.writer,
            "[scroll] window={} bounds={} dx={} dy={} accepted={}",
            e.window.0,
            Rect(e.bounds),
            e.dx,
            e.dy,
            yes_no(e.accepted),
        );
    }

    fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
        let _ = writeln!(
            self.writer,
            "[diagnostic] window={} kind={}",
            e.window.0,
            e.kind.name(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::trace::DiagnosticKind;
    use backdrop_core::window::WindowId;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_flush() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_flush(&FlushEvent {
            window: WindowId(3),
            native_bounds: PixelRect::new(14, 14, 75, 75),
            native_offset: PixelPoint::new(8, 8),
            correction: PixelPoint::new(0, -1),
        });
        let output = output(sink);
        assert_eq!(
            output,
            "[flush] window=3 bounds=75x75+14+14 offset=(8,8) correction=(0,-1)\n"
        );
    }

    #[test]
    fn pretty_print_paint_cycle() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_begin_paint(&BeginPaintEvent {
            paint_index: 2,
            window: WindowId(1),
            native_bounds: PixelRect::new(0, 0, 600, 450),
            device_pixel_ratio: 1.5,
            view_rebuilt: false,
        });
        sink.on_end_paint(&EndPaintEvent {
            paint_index: 2,
            window: WindowId(1),
        });
        let output = output(sink);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[begin] paint=2"), "got: {output}");
        assert!(lines[0].contains("dpr=1.5"), "got: {output}");
        assert!(lines[0].ends_with("view=kept"), "got: {output}");
        assert_eq!(lines[1], "[end] paint=2 window=1");
    }

    #[test]
    fn pretty_print_diagnostic_uses_stable_name() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_diagnostic(&DiagnosticEvent {
            kind: DiagnosticKind::ForeignWindow,
            window: WindowId(5),
        });
        assert!(output(sink).contains("kind=foreign_window"));
    }
}
