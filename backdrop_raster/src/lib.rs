// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software raster backend for backdrop.
//!
//! `backdrop_raster` implements
//! [`PlatformSurface`](backdrop_core::backend::PlatformSurface) over an image
//! in main memory:
//!
//! - [`RasterSurface`] owns the image, keeps static contents across resizes,
//!   clears alpha formats before painting and scrolls in place with
//!   [`scroll_rect_in_image`].
//! - A [`Blitter`] presents flushed regions. [`HeadlessScreen`] keeps one
//!   framebuffer per window for inspection; [`NullBlitter`] discards.
//! - [`HeadlessWindow`] is an in-memory window tree to drive a
//!   [`SurfaceCompositor`](backdrop_core::compositor::SurfaceCompositor)
//!   without a windowing system.
//!
//! ```rust,ignore
//! let window = HeadlessWindow::new(PixelSize::new(400, 300), 1.5);
//! let screen = HeadlessScreen::new();
//! let blitter = screen.clone();
//! let mut compositor = SurfaceCompositor::new(window, CompositorConfig::new(), move |_| {
//!     RasterSurface::new(PixelFormat::Argb32Premultiplied, blitter.clone())
//! });
//! ```

mod headless;
mod scroll;
mod surface;

pub use headless::{Framebuffer, HeadlessScreen, HeadlessWindow};
pub use scroll::scroll_rect_in_image;
pub use surface::{Blitter, NullBlitter, RasterSurface};
