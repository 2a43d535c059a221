// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster images and device-pixel-ratio views onto them.
//!
//! An [`Image`] owns addressable pixel memory in native pixels. Paint code
//! should not have to know the buffer is scaled, so the compositor hands out
//! a [`RasterTarget`]: the same image tagged with a device-pixel ratio taken
//! from an [`ImageView`] descriptor. The descriptor does not own or borrow
//! the pixels; it records the layout it was built for and is rebuilt only when
//! [`ImageView::matches`] fails.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::atomic::{AtomicCell, AtomicOps as _};
use crate::geometry::{PixelPoint, PixelRect, PixelSize};
use crate::refcount::RefCount;
use crate::scale;

/// Pixel layouts an [`Image`] can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit `0xAARRGGBB` in native byte order, color premultiplied by alpha.
    Argb32Premultiplied,
    /// 32-bit `0xFFRRGGBB` in native byte order; alpha is ignored.
    Rgb32,
    /// 16-bit 5-6-5 RGB in native byte order.
    Rgb16,
    /// 8-bit coverage.
    Alpha8,
}

impl PixelFormat {
    /// Bytes used by one pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Argb32Premultiplied | Self::Rgb32 => 4,
            Self::Rgb16 => 2,
            Self::Alpha8 => 1,
        }
    }

    /// Returns `true` if the format stores transparency.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Argb32Premultiplied | Self::Alpha8)
    }

    /// Encodes a color as a raw pixel value of this format.
    #[must_use]
    pub fn encode(self, color: Color) -> u32 {
        match self {
            Self::Argb32Premultiplied => color.premultiplied().to_argb32(),
            Self::Rgb32 => color.to_argb32() | 0xFF00_0000,
            Self::Rgb16 => {
                let r = u32::from(color.r >> 3);
                let g = u32::from(color.g >> 2);
                let b = u32::from(color.b >> 3);
                (r << 11) | (g << 5) | b
            }
            Self::Alpha8 => u32::from(color.a),
        }
    }
}

/// A straight-alpha 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Creates a color with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs as `0xAARRGGBB`.
    #[must_use]
    pub const fn to_argb32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Multiplies the color channels by alpha.
    #[must_use]
    pub fn premultiplied(self) -> Self {
        let mul = |c: u8| {
            let v = u16::from(c) * u16::from(self.a) + 127;
            // (v + (v >> 8)) >> 8 is an exact division by 255 for v < 65536.
            u8::try_from((v + (v >> 8)) >> 8).unwrap_or(u8::MAX)
        };
        Self::rgba(mul(self.r), mul(self.g), mul(self.b), self.a)
    }
}

static NEXT_GENERATION: AtomicCell<usize> = AtomicCell::<usize>::new(1);

/// Allocates a generation number unique for the life of the process.
fn next_generation() -> usize {
    NEXT_GENERATION.fetch_and_add(1)
}

/// Owned, addressable pixel memory.
///
/// Rows are `stride` bytes apart; each row starts with `width` pixels of
/// [`PixelFormat::bytes_per_pixel`] bytes. Every image carries a
/// process-unique *generation* identifying its memory: a reallocated or
/// cloned image always gets a new one, so descriptors built for old memory
/// stop matching.
pub struct Image {
    data: Vec<u8>,
    size: PixelSize,
    stride: usize,
    format: PixelFormat,
    generation: usize,
    painters: RefCount,
}

impl Image {
    /// Allocates a zero-filled image with rows padded to four bytes.
    #[must_use]
    pub fn new(size: PixelSize, format: PixelFormat) -> Self {
        let min_stride = size.width as usize * format.bytes_per_pixel();
        Self::with_stride(size, format, min_stride.next_multiple_of(4))
    }

    /// Allocates a zero-filled image with an explicit row stride.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is shorter than one row of pixels.
    #[must_use]
    pub fn with_stride(size: PixelSize, format: PixelFormat, stride: usize) -> Self {
        let min_stride = size.width as usize * format.bytes_per_pixel();
        assert!(
            stride >= min_stride,
            "stride {stride} is shorter than a row of {min_stride} bytes"
        );
        Self {
            data: vec![0; stride * size.height as usize],
            size,
            stride,
            format,
            generation: next_generation(),
            painters: RefCount::new(),
        }
    }

    /// Size in native pixels.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Width in native pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in native pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Bytes between the starts of consecutive rows.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Identity of the underlying memory.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns `true` if the image covers no pixels.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.size.is_empty()
    }

    /// The rect covering the whole image.
    #[must_use]
    pub fn rect(&self) -> PixelRect {
        PixelRect::from_size(self.size)
    }

    /// All bytes, including row padding.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// All bytes, including row padding, mutably.
    #[must_use]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The pixel bytes of row `y`, without padding.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    /// The pixel bytes of row `y`, without padding, mutably.
    #[must_use]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Reads the raw pixel value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let bpp = self.format.bytes_per_pixel();
        let start = self.offset_of(x, y);
        let bytes = &self.data[start..start + bpp];
        match bytes {
            [a] => u32::from(*a),
            [a, b] => u32::from(u16::from_ne_bytes([*a, *b])),
            [a, b, c, d] => u32::from_ne_bytes([*a, *b, *c, *d]),
            _ => unreachable!("pixel formats are 1, 2 or 4 bytes"),
        }
    }

    /// Writes the raw pixel value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) {
        let start = self.offset_of(x, y);
        let bpp = self.format.bytes_per_pixel();
        write_raw(&mut self.data[start..start + bpp], value);
    }

    /// Fills every pixel with a raw value.
    pub fn fill(&mut self, value: u32) {
        self.fill_rect(self.rect(), value);
    }

    /// Fills the part of `rect` inside the image with a raw value.
    pub fn fill_rect(&mut self, rect: PixelRect, value: u32) {
        let Some((x, y, w, h)) = self.clip(rect) else {
            return;
        };
        let bpp = self.format.bytes_per_pixel();
        for row in y..y + h {
            let start = self.offset_of(x, row);
            for px in self.data[start..start + w as usize * bpp].chunks_exact_mut(bpp) {
                write_raw(px, value);
            }
        }
    }

    /// Copies `src_rect` of `src` so that its top-left lands on `dst`.
    ///
    /// Both rects are clipped to their images. Formats must match; a
    /// mismatched copy is skipped with a warning.
    pub fn copy_rect_from(&mut self, src: &Self, src_rect: PixelRect, dst: PixelPoint) {
        if src.format != self.format {
            tracing::warn!(
                src = ?src.format,
                dst = ?self.format,
                "copy between images of different formats skipped"
            );
            return;
        }
        let delta = src_rect.origin().delta_to(dst);
        let clipped = src_rect
            .intersect(src.rect())
            .translated(delta)
            .intersect(self.rect());
        let Some((x, y, w, h)) = self.clip(clipped) else {
            return;
        };
        let bpp = self.format.bytes_per_pixel();
        let len = w as usize * bpp;
        for row in 0..h {
            let src_x = x.wrapping_add_signed(-delta.x);
            let src_y = (y + row).wrapping_add_signed(-delta.y);
            let from = src.offset_of(src_x, src_y);
            let to = self.offset_of(x, y + row);
            self.data[to..to + len].copy_from_slice(&src.data[from..from + len]);
        }
    }

    /// Returns `true` while a [`Painter`](crate::painter::Painter) is drawing
    /// into this image.
    #[must_use]
    pub fn painting_active(&self) -> bool {
        self.painters.is_held()
    }

    pub(crate) fn painters(&self) -> &RefCount {
        &self.painters
    }

    fn row_bytes(&self) -> usize {
        self.size.width as usize * self.format.bytes_per_pixel()
    }

    fn offset_of(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.size.width && y < self.size.height,
            "pixel ({x}, {y}) outside {:?} image",
            self.size
        );
        y as usize * self.stride + x as usize * self.format.bytes_per_pixel()
    }

    /// Clips `rect` to the image, returning `(x, y, width, height)`.
    fn clip(&self, rect: PixelRect) -> Option<(u32, u32, u32, u32)> {
        let clipped = rect.intersect(self.rect());
        if clipped.is_empty() {
            return None;
        }
        Some((
            clipped.x.unsigned_abs(),
            clipped.y.unsigned_abs(),
            clipped.width,
            clipped.height,
        ))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "raw values are truncated to the pixel width by design of the format"
)]
fn write_raw(px: &mut [u8], value: u32) {
    match px.len() {
        1 => px[0] = value as u8,
        2 => px.copy_from_slice(&(value as u16).to_ne_bytes()),
        _ => px.copy_from_slice(&value.to_ne_bytes()),
    }
}

impl Clone for Image {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            size: self.size,
            stride: self.stride,
            format: self.format,
            generation: next_generation(),
            painters: RefCount::new(),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("size", &self.size)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("generation", &self.generation)
            .field("painters", &self.painters.count())
            .finish_non_exhaustive()
    }
}

/// Describes an [`Image`] as seen by paint code at a device-pixel ratio.
///
/// The view records the memory identity and layout of the image it was
/// built for. It never aliases the pixels itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageView {
    /// Generation of the image the view was built for.
    pub generation: usize,
    /// Native size of that image.
    pub size: PixelSize,
    /// Row stride of that image.
    pub stride: usize,
    /// Pixel format of that image.
    pub format: PixelFormat,
    /// Ratio paint code uses to map logical coordinates onto the pixels.
    pub device_pixel_ratio: f64,
}

impl ImageView {
    /// Builds a view of `image` at `device_pixel_ratio`.
    #[must_use]
    pub fn of(image: &Image, device_pixel_ratio: f64) -> Self {
        Self {
            generation: image.generation(),
            size: image.size(),
            stride: image.stride(),
            format: image.format(),
            device_pixel_ratio,
        }
    }

    /// Returns `true` if `image` still has the memory and layout this view
    /// was built for.
    #[must_use]
    pub fn matches(&self, image: &Image) -> bool {
        self.generation == image.generation()
            && self.size == image.size()
            && self.stride == image.stride()
            && self.format == image.format()
    }

    /// Size in logical pixels.
    #[must_use]
    pub fn logical_size(&self) -> PixelSize {
        scale::from_native_size(self.size, self.device_pixel_ratio)
    }
}

/// An image paint code draws into, tagged with the ratio between its native
/// pixels and the logical coordinates paint code uses.
#[derive(Debug)]
pub struct RasterTarget<'a> {
    image: &'a mut Image,
    device_pixel_ratio: f64,
}

impl<'a> RasterTarget<'a> {
    /// Tags `image` with `device_pixel_ratio`.
    #[must_use]
    pub fn new(image: &'a mut Image, device_pixel_ratio: f64) -> Self {
        Self {
            image,
            device_pixel_ratio,
        }
    }

    /// Ratio between native and logical pixels.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Size in logical pixels.
    #[must_use]
    pub fn logical_size(&self) -> PixelSize {
        scale::from_native_size(self.image.size(), self.device_pixel_ratio)
    }

    /// The underlying image.
    #[must_use]
    pub fn image(&self) -> &Image {
        self.image
    }

    /// The underlying image, mutably.
    #[must_use]
    pub fn image_mut(&mut self) -> &mut Image {
        self.image
    }

    /// Gives up the tag, returning the borrowed image.
    #[must_use]
    pub fn into_image(self) -> &'a mut Image {
        self.image
    }
}
