// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each stamped with the
//! nanoseconds elapsed since the recorder was created. [`decode`] reads them
//! back as an iterator of [`Record`].

use std::time::Instant;

use backdrop_core::geometry::{PixelPoint, PixelRect, PixelSize};
use backdrop_core::trace::{
    BeginPaintEvent, DiagnosticEvent, DiagnosticKind, EndPaintEvent, FlushEvent, ResizeEvent,
    ScrollEvent, TraceSink,
};
use backdrop_core::window::WindowId;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RESIZE: u8 = 1;
const TAG_BEGIN_PAINT: u8 = 2;
const TAG_END_PAINT: u8 = 3;
const TAG_FLUSH: u8 = 4;
const TAG_SCROLL: u8 = 5;
const TAG_DIAGNOSTIC: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin_record(&mut self, tag: u8) {
        let elapsed = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.write_u8(tag);
        self.write_u64(elapsed);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_window(&mut self, w: WindowId) {
        self.write_u32(w.0);
    }

    fn write_size(&mut self, s: PixelSize) {
        self.write_u32(s.width);
        self.write_u32(s.height);
    }

    fn write_point(&mut self, p: PixelPoint) {
        self.write_i32(p.x);
        self.write_i32(p.y);
    }

    fn write_rect(&mut self, r: PixelRect) {
        self.write_i32(r.x);
        self.write_i32(r.y);
        self.write_u32(r.width);
        self.write_u32(r.height);
    }

    fn write_diagnostic(&mut self, k: DiagnosticKind) {
        self.write_u8(match k {
            DiagnosticKind::ForeignWindow => 0,
            DiagnosticKind::MissingHandle => 1,
            DiagnosticKind::ActivePainterAtEndPaint => 2,
            DiagnosticKind::PaintDeviceOutsidePaint => 3,
            DiagnosticKind::StaticContentsUnsupported => 4,
            DiagnosticKind::RoundingDiscrepancy => 5,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_resize(&mut self, e: &ResizeEvent) {
        self.begin_record(TAG_RESIZE);
        self.write_window(e.window);
        self.write_size(e.logical_size);
        self.write_size(e.native_size);
        self.write_u8(u8::from(e.reallocated));
    }

    fn on_begin_paint(&mut self, e: &BeginPaintEvent) {
        self.begin_record(TAG_BEGIN_PAINT);
        self.write_u64(e.paint_index);
        self.write_window(e.window);
        self.write_rect(e.native_bounds);
        self.write_f64(e.device_pixel_ratio);
        self.write_u8(u8::from(e.view_rebuilt));
    }

    fn on_end_paint(&mut self, e: &EndPaintEvent) {
        self.begin_record(TAG_END_PAINT);
        self.write_u64(e.paint_index);
        self.write_window(e.window);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.begin_record(TAG_FLUSH);
        self.write_window(e.window);
        self.write_rect(e.native_bounds);
        self.write_point(e.native_offset);
        self.write_point(e.correction);
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.begin_record(TAG_SCROLL);
        self.write_window(e.window);
        self.write_rect(e.bounds);
        self.write_i32(e.dx);
        self.write_i32(e.dy);
        self.write_u8(u8::from(e.accepted));
    }

    fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
        self.begin_record(TAG_DIAGNOSTIC);
        self.write_diagnostic(e.kind);
        self.write_window(e.window);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
    /// A [`BeginPaintEvent`].
    BeginPaint(BeginPaintEvent),
    /// An [`EndPaintEvent`].
    EndPaint(EndPaintEvent),
    /// A [`FlushEvent`].
    Flush(FlushEvent),
    /// A [`ScrollEvent`].
    Scroll(ScrollEvent),
    /// A [`DiagnosticEvent`].
    Diagnostic(DiagnosticEvent),
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Nanoseconds between the recorder's creation and the event.
    pub timestamp_ns: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_window(&mut self) -> Option<WindowId> {
        self.read_u32().map(WindowId)
    }

    fn read_size(&mut self) -> Option<PixelSize> {
        Some(PixelSize::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_point(&mut self) -> Option<PixelPoint> {
        Some(PixelPoint::new(self.read_i32()?, self.read_i32()?))
    }

    fn read_rect(&mut self) -> Option<PixelRect> {
        Some(PixelRect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_u32()?,
            self.read_u32()?,
        ))
    }

    fn read_diagnostic(&mut self) -> Option<DiagnosticKind> {
        Some(match self.read_u8()? {
            0 => DiagnosticKind::ForeignWindow,
            1 => DiagnosticKind::MissingHandle,
            2 => DiagnosticKind::ActivePainterAtEndPaint,
            3 => DiagnosticKind::PaintDeviceOutsidePaint,
            4 => DiagnosticKind::StaticContentsUnsupported,
            _ => DiagnosticKind::RoundingDiscrepancy,
        })
    }

    fn decode_resize(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Resize(ResizeEvent {
            window: self.read_window()?,
            logical_size: self.read_size()?,
            native_size: self.read_size()?,
            reallocated: self.read_bool()?,
        }))
    }

    fn decode_begin_paint(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::BeginPaint(BeginPaintEvent {
            paint_index: self.read_u64()?,
            window: self.read_window()?,
            native_bounds: self.read_rect()?,
            device_pixel_ratio: self.read_f64()?,
            view_rebuilt: self.read_bool()?,
        }))
    }

    fn decode_end_paint(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EndPaint(EndPaintEvent {
            paint_index: self.read_u64()?,
            window: self.read_window()?,
        }))
    }

    fn decode_flush(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Flush(FlushEvent {
            window: self.read_window()?,
            native_bounds: self.read_rect()?,
            native_offset: self.read_point()?,
            correction: self.read_point()?,
        }))
    }

    fn decode_scroll(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Scroll(ScrollEvent {
            window: self.read_window()?,
            bounds: self.read_rect()?,
            dx: self.read_i32()?,
            dy: self.read_i32()?,
            accepted: self.read_bool()?,
        }))
    }

    fn decode_diagnostic(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Diagnostic(DiagnosticEvent {
            kind: self.read_diagnostic()?,
            window: self.read_window()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let timestamp_ns = self.read_u64()?;
        let event = match tag {
            TAG_RESIZE => self.decode_resize(),
            TAG_BEGIN_PAINT => self.decode_begin_paint(),
            TAG_END_PAINT => self.decode_end_paint(),
            TAG_FLUSH => self.decode_flush(),
            TAG_SCROLL => self.decode_scroll(),
            TAG_DIAGNOSTIC => self.decode_diagnostic(),
            _ => None, // unknown tag → stop iteration
        }?;
        Some(Record {
            timestamp_ns,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin_paint() -> BeginPaintEvent {
        BeginPaintEvent {
            paint_index: 7,
            window: WindowId(1),
            native_bounds: PixelRect::new(-3, 4, 600, 450),
            device_pixel_ratio: 1.5,
            view_rebuilt: true,
        }
    }

    fn sample_flush() -> FlushEvent {
        FlushEvent {
            window: WindowId(2),
            native_bounds: PixelRect::new(14, 14, 75, 75),
            native_offset: PixelPoint::new(8, 8),
            correction: PixelPoint::new(-1, -1),
        }
    }

    fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
        decode(rec.as_bytes()).map(|r| r.event).collect()
    }

    #[test]
    fn paint_cycle_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let resize = ResizeEvent {
            window: WindowId(1),
            logical_size: PixelSize::new(400, 300),
            native_size: PixelSize::new(600, 450),
            reallocated: true,
        };
        let end = EndPaintEvent {
            paint_index: 7,
            window: WindowId(1),
        };
        rec.on_resize(&resize);
        rec.on_begin_paint(&sample_begin_paint());
        rec.on_end_paint(&end);
        rec.on_flush(&sample_flush());

        assert_eq!(
            events(&rec),
            vec![
                RecordedEvent::Resize(resize),
                RecordedEvent::BeginPaint(sample_begin_paint()),
                RecordedEvent::EndPaint(end),
                RecordedEvent::Flush(sample_flush()),
            ]
        );
    }

    #[test]
    fn scroll_and_diagnostics_decode() {
        let mut rec = RecorderSink::new();
        let scroll = ScrollEvent {
            window: WindowId(4),
            bounds: PixelRect::new(0, 0, 10, 10),
            dx: -1,
            dy: 0,
            accepted: false,
        };
        rec.on_scroll(&scroll);
        for kind in [
            DiagnosticKind::ForeignWindow,
            DiagnosticKind::RoundingDiscrepancy,
        ] {
            rec.on_diagnostic(&DiagnosticEvent {
                kind,
                window: WindowId(9),
            });
        }

        let decoded = events(&rec);
        assert_eq!(decoded[0], RecordedEvent::Scroll(scroll));
        assert!(matches!(
            decoded[2],
            RecordedEvent::Diagnostic(DiagnosticEvent {
                kind: DiagnosticKind::RoundingDiscrepancy,
                window: WindowId(9),
            })
        ));
    }

    #[test]
    fn timestamps_do_not_decrease() {
        let mut rec = RecorderSink::new();
        for _ in 0..10 {
            rec.on_flush(&sample_flush());
        }
        let stamps: Vec<u64> = decode(rec.as_bytes()).map(|r| r.timestamp_ns).collect();
        assert_eq!(stamps.len(), 10);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_flush(&sample_flush());
        rec.on_flush(&sample_flush());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
