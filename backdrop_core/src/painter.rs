// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal drawing context for raster targets.

use crate::geometry::PixelRect;
use crate::image::{Color, Image, RasterTarget};

/// Draws into a [`RasterTarget`] using logical coordinates.
///
/// While a painter exists its image reports
/// [`painting_active`](Image::painting_active). Dropping the painter or
/// calling [`end`](Self::end) finishes painting. A painter leaked with
/// [`core::mem::forget`] leaves the image marked as painted, which
/// [`SurfaceCompositor::end_paint`](crate::compositor::SurfaceCompositor::end_paint)
/// reports.
#[derive(Debug)]
pub struct Painter<'a> {
    image: &'a mut Image,
    device_pixel_ratio: f64,
}

impl<'a> Painter<'a> {
    /// Starts painting on `target`.
    #[must_use]
    pub fn new(target: RasterTarget<'a>) -> Self {
        let device_pixel_ratio = target.device_pixel_ratio();
        let image = target.into_image();
        image.painters().acquire();
        Self {
            image,
            device_pixel_ratio,
        }
    }

    /// Ratio applied to every logical coordinate.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Fills a rect given in logical coordinates.
    ///
    /// Edges are scaled by the device-pixel ratio and rounded to the nearest
    /// native pixel, so adjacent rects tile without gaps.
    pub fn fill_rect(&mut self, rect: kurbo::Rect, color: Color) {
        let native = rect.abs().scale_from_origin(self.device_pixel_ratio).round();
        let value = self.image.format().encode(color);
        self.image.fill_rect(to_pixel_rect(native), value);
    }

    /// Fills the whole target.
    pub fn fill(&mut self, color: Color) {
        let value = self.image.format().encode(color);
        self.image.fill(value);
    }

    /// Finishes painting.
    pub fn end(self) {}
}

impl Drop for Painter<'_> {
    fn drop(&mut self) {
        self.image.painters().release();
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "coordinates are rounded and clamped to the i32 range first"
)]
fn to_pixel_rect(rect: kurbo::Rect) -> PixelRect {
    let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    let (x0, y0, x1, y1) = (clamp(rect.x0), clamp(rect.y0), clamp(rect.x1), clamp(rect.y1));
    PixelRect::new(x0, y0, x1.abs_diff(x0), y1.abs_diff(y0))
}
