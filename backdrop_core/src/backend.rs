// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform surfaces.
//!
//! Backdrop splits platform-specific work into *backend* crates. Each backend
//! implements [`PlatformSurface`] for the buffer type it manages:
//!
//! - **Storage** — The surface owns a buffer in native pixels and reallocates
//!   it on [`resize`](PlatformSurface::resize), preserving static contents
//!   when it can.
//!
//! - **Paint device** — Between [`begin_paint`](PlatformSurface::begin_paint)
//!   and [`end_paint`](PlatformSurface::end_paint) the surface exposes what
//!   paint code draws into: addressable raster memory or an opaque GPU
//!   target.
//!
//! - **Presentation** — [`flush`](PlatformSurface::flush) copies a region of
//!   the buffer to a window.
//!
//! Every coordinate a surface receives is already in native pixels. Scaling
//! from logical pixels is the job of
//! [`SurfaceCompositor`](crate::compositor::SurfaceCompositor), so backends
//! never see a device-pixel ratio.
//!
//! # Crate boundaries
//!
//! `backdrop_core` owns the scaling logic and this contract module. Backend
//! crates depend on `backdrop_core` and provide platform glue. Application
//! code depends on both and wires a backend into a compositor.

use alloc::boxed::Box;

use crate::geometry::{PixelPoint, PixelSize, Region};
use crate::image::Image;
use crate::window::Window;

/// What a surface exposes to paint code.
#[derive(Debug)]
pub enum PaintDevice<'a> {
    /// Addressable raster memory.
    Image(&'a mut Image),
    /// A GPU-only target paint code cannot address directly.
    Gpu(GpuTarget),
}

/// Opaque handle to a GPU render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GpuTarget {
    /// Backend-specific identifier.
    pub id: u64,
    /// Size in native pixels.
    pub size: PixelSize,
}

/// Optional features a surface supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceCapabilities {
    /// Content outside the painted region survives a resize.
    pub static_contents: bool,
}

/// A platform backing store addressed in native pixels.
///
/// # Paint cycle
///
/// A typical paint cycle driven by the compositor looks like this:
///
/// ```rust,ignore
/// surface.resize(native_size, &native_static);   // only if the size changed
/// surface.begin_paint(&native_region);
/// match surface.paint_device() {
///     PaintDevice::Image(image) => draw(image),
///     PaintDevice::Gpu(target) => submit(target),
/// }
/// surface.end_paint();
/// surface.flush(&window, &native_region, native_offset);
/// ```
pub trait PlatformSurface {
    /// Current buffer size.
    fn size(&self) -> PixelSize;

    /// Reallocates the buffer for `size`.
    ///
    /// `static_contents` lists the rects whose pixels should survive the
    /// reallocation; surfaces without
    /// [`static_contents`](SurfaceCapabilities::static_contents) support may
    /// ignore it.
    fn resize(&mut self, size: PixelSize, static_contents: &Region);

    /// Prepares `region` for painting.
    fn begin_paint(&mut self, region: &Region);

    /// Finishes the paint started by [`begin_paint`](Self::begin_paint).
    fn end_paint(&mut self) {}

    /// The target paint code draws into.
    fn paint_device(&mut self) -> PaintDevice<'_>;

    /// Presents `region` of the buffer on `window`.
    ///
    /// `offset` is where `window` sits inside the window the surface was
    /// created for, so buffer content at `p + offset` lands on `p` in
    /// `window`.
    fn flush(&mut self, window: &dyn Window, region: &Region, offset: PixelPoint);

    /// Moves the contents of `area` by `(dx, dy)` in place.
    ///
    /// Returns `false` if the surface cannot scroll, in which case the caller
    /// repaints instead.
    fn scroll(&mut self, area: &Region, dx: i32, dy: i32) -> bool {
        _ = (area, dx, dy);
        false
    }

    /// Features this surface supports.
    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::default()
    }

    /// Copies the current contents into a new image, if the surface can.
    fn to_image(&self) -> Option<Image> {
        None
    }
}

impl<T: PlatformSurface + ?Sized> PlatformSurface for Box<T> {
    fn size(&self) -> PixelSize {
        (**self).size()
    }

    fn resize(&mut self, size: PixelSize, static_contents: &Region) {
        (**self).resize(size, static_contents);
    }

    fn begin_paint(&mut self, region: &Region) {
        (**self).begin_paint(region);
    }

    fn end_paint(&mut self) {
        (**self).end_paint();
    }

    fn paint_device(&mut self) -> PaintDevice<'_> {
        (**self).paint_device()
    }

    fn flush(&mut self, window: &dyn Window, region: &Region, offset: PixelPoint) {
        (**self).flush(window, region, offset);
    }

    fn scroll(&mut self, area: &Region, dx: i32, dy: i32) -> bool {
        (**self).scroll(area, dx, dy)
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        (**self).capabilities()
    }

    fn to_image(&self) -> Option<Image> {
        (**self).to_image()
    }
}
