// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the paint cycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! compositor calls at each operation. All method bodies default to no-ops,
//! so implementing only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed `TraceSink`. Per-operation events
//! ([`ResizeEvent`], [`BeginPaintEvent`], [`EndPaintEvent`], [`FlushEvent`],
//! [`ScrollEvent`]) compile to nothing when the `trace` feature is **off**.
//! [`DiagnosticEvent`]s report misuse and are delivered in every build.
//!
//! # Crate features
//!
//! - `trace` — enables the per-operation `Tracer` methods (one branch per
//!   call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::geometry::{PixelPoint, PixelRect, PixelSize};
use crate::window::WindowId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What went wrong in a [`DiagnosticEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Flush targeted a window that is neither the compositor's window nor
    /// one of its descendants.
    ForeignWindow,
    /// Flush targeted a window without a platform handle.
    MissingHandle,
    /// `end_paint` ran while a painter was still active on the image.
    ActivePainterAtEndPaint,
    /// The paint device was requested outside `begin_paint`/`end_paint`.
    PaintDeviceOutsidePaint,
    /// Static contents were set on a surface that cannot preserve them.
    StaticContentsUnsupported,
    /// The flush offset correction exceeded one native pixel and was
    /// clamped.
    RoundingDiscrepancy,
}

impl DiagnosticKind {
    /// A short stable name, suitable for logs and trace files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForeignWindow => "foreign_window",
            Self::MissingHandle => "missing_handle",
            Self::ActivePainterAtEndPaint => "active_painter_at_end_paint",
            Self::PaintDeviceOutsidePaint => "paint_device_outside_paint",
            Self::StaticContentsUnsupported => "static_contents_unsupported",
            Self::RoundingDiscrepancy => "rounding_discrepancy",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the compositor records a new window size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    /// The compositor's window.
    pub window: WindowId,
    /// New size in logical pixels.
    pub logical_size: PixelSize,
    /// New size in native pixels.
    pub native_size: PixelSize,
    /// Whether the platform surface was asked to reallocate.
    pub reallocated: bool,
}

/// Emitted when a paint begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeginPaintEvent {
    /// Monotonic paint counter.
    pub paint_index: u64,
    /// The compositor's window.
    pub window: WindowId,
    /// Bounding rect of the painted region in native pixels.
    pub native_bounds: PixelRect,
    /// Effective device-pixel ratio of the paint.
    pub device_pixel_ratio: f64,
    /// Whether the DPI view had to be rebuilt.
    pub view_rebuilt: bool,
}

/// Emitted when a paint ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndPaintEvent {
    /// Paint counter of the matching [`BeginPaintEvent`].
    pub paint_index: u64,
    /// The compositor's window.
    pub window: WindowId,
}

/// Emitted when a region is forwarded to the platform for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushEvent {
    /// The window being flushed to.
    pub window: WindowId,
    /// Bounding rect of the forwarded region in native pixels.
    pub native_bounds: PixelRect,
    /// Forwarded offset in native pixels.
    pub native_offset: PixelPoint,
    /// Translation applied to the region to absorb rounding.
    pub correction: PixelPoint,
}

/// Emitted for every scroll request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollEvent {
    /// The compositor's window.
    pub window: WindowId,
    /// Bounding rect of the scrolled area in logical pixels.
    pub bounds: PixelRect,
    /// Horizontal delta in logical pixels.
    pub dx: i32,
    /// Vertical delta in logical pixels.
    pub dy: i32,
    /// Whether the contents were scrolled.
    pub accepted: bool,
}

/// Reports misuse of the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticEvent {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// The window involved.
    pub window: WindowId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a compositor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a new window size is recorded.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called when a paint begins.
    fn on_begin_paint(&mut self, e: &BeginPaintEvent) {
        _ = e;
    }

    /// Called when a paint ends.
    fn on_end_paint(&mut self, e: &EndPaintEvent) {
        _ = e;
    }

    /// Called when a region is forwarded for presentation.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called for every scroll request.
    fn on_scroll(&mut self, e: &ScrollEvent) {
        _ = e;
    }

    /// Called when the compositor detects misuse.
    fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
        _ = e;
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_resize(&mut self, e: &ResizeEvent) {
        self.borrow_mut().on_resize(e);
    }

    fn on_begin_paint(&mut self, e: &BeginPaintEvent) {
        self.borrow_mut().on_begin_paint(e);
    }

    fn on_end_paint(&mut self, e: &EndPaintEvent) {
        self.borrow_mut().on_end_paint(e);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.borrow_mut().on_flush(e);
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.borrow_mut().on_scroll(e);
    }

    fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
        self.borrow_mut().on_diagnostic(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every per-operation method compiles
/// to nothing. [`diagnostic`](Self::diagnostic) always checks the inner
/// `Option` (one branch) before dispatching.
#[derive(Default)]
pub struct Tracer {
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Returns `true` if a sink is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    /// Detaches and returns the sink.
    pub fn take(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Emits a [`ResizeEvent`].
    #[inline]
    pub fn resize(&mut self, e: &ResizeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resize(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BeginPaintEvent`].
    #[inline]
    pub fn begin_paint(&mut self, e: &BeginPaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_begin_paint(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EndPaintEvent`].
    #[inline]
    pub fn end_paint(&mut self, e: &EndPaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_end_paint(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushEvent`].
    #[inline]
    pub fn flush(&mut self, e: &FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScrollEvent`].
    #[inline]
    pub fn scroll(&mut self, e: &ScrollEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scroll(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DiagnosticEvent`]. Delivered regardless of the `trace`
    /// feature.
    #[inline]
    pub fn diagnostic(&mut self, e: &DiagnosticEvent) {
        if let Some(s) = &mut self.sink {
            s.on_diagnostic(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
