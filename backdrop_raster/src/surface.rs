// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`PlatformSurface`] backed by an owned raster image.

use backdrop_core::backend::{PaintDevice, PlatformSurface, SurfaceCapabilities};
use backdrop_core::geometry::{PixelPoint, PixelSize, Region};
use backdrop_core::image::{Image, PixelFormat};
use backdrop_core::window::Window;

use crate::scroll::scroll_rect_in_image;

/// Presents image contents on a window.
pub trait Blitter {
    /// Copies `region` of `image` onto `window`.
    ///
    /// Image pixel `p` lands on window pixel `p - offset`.
    fn blit(&mut self, window: &dyn Window, image: &Image, region: &Region, offset: PixelPoint);
}

/// A [`Blitter`] that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBlitter;

impl Blitter for NullBlitter {
    fn blit(&mut self, window: &dyn Window, image: &Image, region: &Region, offset: PixelPoint) {
        _ = (window, image, region, offset);
    }
}

/// Software backing store: an image in main memory plus a [`Blitter`] that
/// presents it.
#[derive(Debug)]
pub struct RasterSurface<B> {
    image: Image,
    blitter: B,
    reallocations: u32,
}

impl<B: Blitter> RasterSurface<B> {
    /// Creates an empty surface that allocates images of `format`.
    #[must_use]
    pub fn new(format: PixelFormat, blitter: B) -> Self {
        Self {
            image: Image::new(PixelSize::ZERO, format),
            blitter,
            reallocations: 0,
        }
    }

    /// The backing image.
    #[must_use]
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// The blitter.
    #[must_use]
    pub fn blitter(&self) -> &B {
        &self.blitter
    }

    /// The blitter, mutably.
    #[must_use]
    pub fn blitter_mut(&mut self) -> &mut B {
        &mut self.blitter
    }

    /// How many times the image has been reallocated.
    #[must_use]
    pub fn reallocations(&self) -> u32 {
        self.reallocations
    }
}

impl<B: Blitter> PlatformSurface for RasterSurface<B> {
    fn size(&self) -> PixelSize {
        self.image.size()
    }

    fn resize(&mut self, size: PixelSize, static_contents: &Region) {
        if size == self.image.size() {
            return;
        }
        let mut image = Image::new(size, self.image.format());
        for rect in static_contents.rects() {
            image.copy_rect_from(&self.image, *rect, rect.origin());
        }
        tracing::debug!(
            from = ?self.image.size(),
            to = ?size,
            kept = static_contents.rect_count(),
            "reallocating raster backing store"
        );
        self.image = image;
        self.reallocations += 1;
    }

    fn begin_paint(&mut self, region: &Region) {
        if self.image.format().has_alpha() {
            for rect in region.rects() {
                self.image.fill_rect(*rect, 0);
            }
        }
    }

    fn paint_device(&mut self) -> PaintDevice<'_> {
        PaintDevice::Image(&mut self.image)
    }

    fn flush(&mut self, window: &dyn Window, region: &Region, offset: PixelPoint) {
        self.blitter.blit(window, &self.image, region, offset);
    }

    fn scroll(&mut self, area: &Region, dx: i32, dy: i32) -> bool {
        if self.image.is_null() {
            return false;
        }
        let offset = PixelPoint::new(dx, dy);
        for rect in area.rects() {
            scroll_rect_in_image(&mut self.image, *rect, offset);
        }
        true
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities {
            static_contents: true,
        }
    }

    fn to_image(&self) -> Option<Image> {
        (!self.image.is_null()).then(|| self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use backdrop_core::geometry::PixelRect;

    use super::*;

    fn surface(format: PixelFormat) -> RasterSurface<NullBlitter> {
        RasterSurface::new(format, NullBlitter)
    }

    #[test]
    fn resize_to_same_size_keeps_image() {
        let mut s = surface(PixelFormat::Rgb32);
        s.resize(PixelSize::new(8, 8), &Region::new());
        let generation = s.image().generation();
        s.resize(PixelSize::new(8, 8), &Region::new());
        assert_eq!(s.reallocations(), 1);
        assert_eq!(s.image().generation(), generation);
    }

    #[test]
    fn resize_keeps_static_contents() {
        let mut s = surface(PixelFormat::Rgb32);
        s.resize(PixelSize::new(4, 4), &Region::new());
        s.begin_paint(&Region::from_rect(PixelRect::new(0, 0, 4, 4)));
        if let PaintDevice::Image(image) = s.paint_device() {
            image.fill(0xFF00_00FF);
        }
        s.end_paint();

        let kept = Region::from_rect(PixelRect::new(0, 0, 2, 6));
        s.resize(PixelSize::new(6, 6), &kept);
        let image = s.image();
        assert_eq!(image.pixel(1, 3), 0xFF00_00FF);
        assert_eq!(image.pixel(1, 4), 0, "outside the old image");
        assert_eq!(image.pixel(3, 0), 0, "outside the static region");
    }

    #[test]
    fn begin_paint_clears_alpha_formats_only() {
        let region = Region::from_rect(PixelRect::new(0, 0, 2, 1));
        for (format, cleared) in [
            (PixelFormat::Argb32Premultiplied, true),
            (PixelFormat::Rgb32, false),
        ] {
            let mut s = surface(format);
            s.resize(PixelSize::new(3, 1), &Region::new());
            if let PaintDevice::Image(image) = s.paint_device() {
                image.fill(0xFFFF_FFFF);
            }
            s.begin_paint(&region);
            assert_eq!(s.image().pixel(0, 0) == 0, cleared, "{format:?}");
            assert_eq!(s.image().pixel(2, 0), 0xFFFF_FFFF, "{format:?}");
        }
    }

    #[test]
    fn scroll_requires_an_image() {
        let mut s = surface(PixelFormat::Rgb32);
        let area = Region::from_rect(PixelRect::new(0, 0, 4, 4));
        assert!(!s.scroll(&area, 0, 1));
        assert!(s.to_image().is_none());

        s.resize(PixelSize::new(4, 4), &Region::new());
        assert!(s.scroll(&area, 0, 1));
        assert!(s.to_image().is_some());
    }
}
