// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Paints become duration slices; everything else is an instant event. Each
/// window gets its own track (`tid`).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = nanos_to_us(record.timestamp_ns);
        match record.event {
            RecordedEvent::Resize(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resize",
                    "cat": "Surface",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "s": "t",
                    "args": {
                        "logical": [e.logical_size.width, e.logical_size.height],
                        "native": [e.native_size.width, e.native_size.height],
                        "reallocated": e.reallocated,
                    }
                }));
            }
            RecordedEvent::BeginPaint(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Paint",
                    "cat": "Paint",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "args": {
                        "paint_index": e.paint_index,
                        "bounds": [
                            e.native_bounds.x,
                            e.native_bounds.y,
                            e.native_bounds.width,
                            e.native_bounds.height,
                        ],
                        "device_pixel_ratio": e.device_pixel_ratio,
                        "view_rebuilt": e.view_rebuilt,
                    }
                }));
            }
            RecordedEvent::EndPaint(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Paint",
                    "cat": "Paint",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "args": {
                        "paint_index": e.paint_index,
                    }
                }));
            }
            RecordedEvent::Flush(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Flush",
                    "cat": "Surface",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "s": "t",
                    "args": {
                        "bounds": [
                            e.native_bounds.x,
                            e.native_bounds.y,
                            e.native_bounds.width,
                            e.native_bounds.height,
                        ],
                        "offset": [e.native_offset.x, e.native_offset.y],
                        "correction": [e.correction.x, e.correction.y],
                    }
                }));
            }
            RecordedEvent::Scroll(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Scroll",
                    "cat": "Surface",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "s": "t",
                    "args": {
                        "bounds": [e.bounds.x, e.bounds.y, e.bounds.width, e.bounds.height],
                        "dx": e.dx,
                        "dy": e.dy,
                        "accepted": e.accepted,
                    }
                }));
            }
            RecordedEvent::Diagnostic(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.kind.name(),
                    "cat": "Diagnostic",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.window.0,
                    "s": "p",
                    "args": {}
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use backdrop_core::geometry::{PixelPoint, PixelRect};
    use backdrop_core::trace::{
        BeginPaintEvent, DiagnosticEvent, DiagnosticKind, EndPaintEvent, FlushEvent, TraceSink,
    };
    use backdrop_core::window::WindowId;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_begin_paint(&BeginPaintEvent {
            paint_index: 0,
            window: WindowId(1),
            native_bounds: PixelRect::new(0, 0, 600, 450),
            device_pixel_ratio: 1.5,
            view_rebuilt: true,
        });
        rec.on_end_paint(&EndPaintEvent {
            paint_index: 0,
            window: WindowId(1),
        });
        rec.on_flush(&FlushEvent {
            window: WindowId(1),
            native_bounds: PixelRect::new(14, 14, 75, 75),
            native_offset: PixelPoint::new(8, 8),
            correction: PixelPoint::ORIGIN,
        });
        rec.on_diagnostic(&DiagnosticEvent {
            kind: DiagnosticKind::MissingHandle,
            window: WindowId(2),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Paint");
        assert_eq!(parsed[0]["args"]["device_pixel_ratio"], 1.5);

        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["name"], "Paint");

        assert_eq!(parsed[2]["ph"], "i");
        assert_eq!(parsed[2]["name"], "Flush");
        assert_eq!(parsed[2]["args"]["offset"], json!([8, 8]));

        assert_eq!(parsed[3]["name"], "missing_handle");
        assert_eq!(parsed[3]["tid"], 2);

        let first = parsed[0]["ts"].as_f64().unwrap();
        let last = parsed[3]["ts"].as_f64().unwrap();
        assert!(first <= last);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
