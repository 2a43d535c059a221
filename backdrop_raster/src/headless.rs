// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windows and a screen that live entirely in memory.
//!
//! [`HeadlessWindow`] models a window tree (parents, transient parents,
//! platform handles) without a windowing system. [`HeadlessScreen`] is a
//! [`Blitter`] that keeps one framebuffer per window, so tests and demos can
//! inspect exactly what a flush presented.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use backdrop_core::atomic::{AtomicCell, AtomicOps as _};
use backdrop_core::geometry::{PixelPoint, PixelRect, PixelSize, Region};
use backdrop_core::image::Image;
use backdrop_core::scale;
use backdrop_core::window::{Window, WindowId};

use crate::surface::Blitter;

static NEXT_WINDOW_ID: AtomicCell<u32> = AtomicCell::<u32>::new(1);

struct WindowData {
    id: WindowId,
    size: Cell<PixelSize>,
    device_pixel_ratio: Cell<f64>,
    has_handle: Cell<bool>,
    parent: Option<HeadlessWindow>,
    transient_parent: Option<HeadlessWindow>,
}

/// A shared handle to an in-memory window.
///
/// Clones refer to the same window.
#[derive(Clone)]
pub struct HeadlessWindow(Rc<WindowData>);

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("id", &self.0.id)
            .field("size", &self.0.size.get())
            .field("device_pixel_ratio", &self.0.device_pixel_ratio.get())
            .field("has_handle", &self.0.has_handle.get())
            .field("parent", &self.0.parent.as_ref().map(Window::id))
            .field(
                "transient_parent",
                &self.0.transient_parent.as_ref().map(Window::id),
            )
            .finish()
    }
}

impl HeadlessWindow {
    fn build(
        size: PixelSize,
        device_pixel_ratio: f64,
        parent: Option<Self>,
        transient_parent: Option<Self>,
    ) -> Self {
        Self(Rc::new(WindowData {
            id: WindowId(NEXT_WINDOW_ID.fetch_and_add(1)),
            size: Cell::new(size),
            device_pixel_ratio: Cell::new(device_pixel_ratio),
            has_handle: Cell::new(true),
            parent,
            transient_parent,
        }))
    }

    /// Creates a top-level window.
    #[must_use]
    pub fn new(size: PixelSize, device_pixel_ratio: f64) -> Self {
        Self::build(size, device_pixel_ratio, None, None)
    }

    /// Creates a window embedded in `self`.
    #[must_use]
    pub fn child(&self, size: PixelSize) -> Self {
        Self::build(size, self.device_pixel_ratio(), Some(self.clone()), None)
    }

    /// Creates a top-level window owned by `self`, such as a dialog or popup.
    ///
    /// The owner is a transient parent: it is not part of the new window's
    /// ancestry.
    #[must_use]
    pub fn transient(&self, size: PixelSize) -> Self {
        Self::build(size, self.device_pixel_ratio(), None, Some(self.clone()))
    }

    /// The owner of a dialog or popup.
    #[must_use]
    pub fn transient_parent(&self) -> Option<Self> {
        self.0.transient_parent.clone()
    }

    /// Changes the logical size.
    pub fn set_size(&self, size: PixelSize) {
        self.0.size.set(size);
    }

    /// Moves the window to a screen with another device-pixel ratio.
    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.0.device_pixel_ratio.set(ratio);
    }

    /// Creates or destroys the platform handle.
    pub fn set_has_handle(&self, has_handle: bool) {
        self.0.has_handle.set(has_handle);
    }
}

impl Window for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.0.id
    }

    fn size(&self) -> PixelSize {
        self.0.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.0.device_pixel_ratio.get()
    }

    fn has_handle(&self) -> bool {
        self.0.has_handle.get()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.clone()
    }
}

/// Presented pixels of one window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    size: PixelSize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    fn new(size: PixelSize) -> Self {
        Self {
            size,
            pixels: vec![0; size.area()],
        }
    }

    /// Size in native pixels.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Raw pixel values, row by row.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The raw value at `(x, y)`, if inside the framebuffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    /// Copies `src` of `image` so that its top-left lands on `dst`, clipping
    /// to both.
    fn copy_from(&mut self, image: &Image, src: PixelRect, dst: PixelPoint) {
        let delta = src.origin().delta_to(dst);
        let clipped = src
            .intersect(image.rect())
            .translated(delta)
            .intersect(PixelRect::from_size(self.size));
        if clipped.is_empty() {
            return;
        }
        let width = self.size.width as usize;
        let (x0, y0) = (clipped.x.unsigned_abs(), clipped.y.unsigned_abs());
        let (sx0, sy0) = (
            x0.wrapping_add_signed(-delta.x),
            y0.wrapping_add_signed(-delta.y),
        );
        let bpp = image.format().bytes_per_pixel();
        for row in 0..clipped.height {
            let start = (y0 + row) as usize * width + x0 as usize;
            let out = &mut self.pixels[start..start + clipped.width as usize];
            if bpp == 4 {
                let from = sx0 as usize * bpp;
                let bytes = &image.row(sy0 + row)[from..from + out.len() * bpp];
                bytemuck::cast_slice_mut::<u32, u8>(out).copy_from_slice(bytes);
            } else {
                for (i, px) in (0..).zip(out.iter_mut()) {
                    *px = image.pixel(sx0 + i, sy0 + row);
                }
            }
        }
    }
}

/// A [`Blitter`] presenting into in-memory framebuffers.
///
/// Each window gets a framebuffer of its logical size times its
/// device-pixel ratio, reallocated whenever that changes. Clones share the
/// framebuffers, so a test can keep one handle while the surface owns
/// another.
#[derive(Clone, Debug, Default)]
pub struct HeadlessScreen {
    state: Rc<RefCell<ScreenState>>,
}

#[derive(Debug, Default)]
struct ScreenState {
    framebuffers: HashMap<WindowId, Framebuffer>,
    blits: u64,
}

impl HeadlessScreen {
    /// Creates a screen with no framebuffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the framebuffer presented for `window`, if any.
    #[must_use]
    pub fn framebuffer(&self, window: WindowId) -> Option<Framebuffer> {
        self.state.borrow().framebuffers.get(&window).cloned()
    }

    /// The raw value presented at `(x, y)` on `window`.
    #[must_use]
    pub fn pixel(&self, window: WindowId, x: u32, y: u32) -> Option<u32> {
        self.state
            .borrow()
            .framebuffers
            .get(&window)
            .and_then(|fb| fb.pixel(x, y))
    }

    /// Number of blits performed.
    #[must_use]
    pub fn blit_count(&self) -> u64 {
        self.state.borrow().blits
    }
}

impl Blitter for HeadlessScreen {
    fn blit(&mut self, window: &dyn Window, image: &Image, region: &Region, offset: PixelPoint) {
        let size = scale::to_native_size(window.size(), window.device_pixel_ratio());
        let mut state = self.state.borrow_mut();
        state.blits += 1;
        let framebuffer = state
            .framebuffers
            .entry(window.id())
            .or_insert_with(|| Framebuffer::new(size));
        if framebuffer.size != size {
            tracing::trace!(window = ?window.id(), ?size, "reallocating framebuffer");
            *framebuffer = Framebuffer::new(size);
        }
        for rect in region.rects() {
            let dst = PixelPoint::new(rect.x - offset.x, rect.y - offset.y);
            framebuffer.copy_from(image, *rect, dst);
        }
    }
}
