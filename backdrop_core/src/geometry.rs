// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel geometry.
//!
//! Both logical (device-independent) and native (buffer) coordinates are
//! whole pixels. The types here carry no unit; the
//! [`scale`](crate::scale) module converts between the two spaces.

use alloc::vec::Vec;
use core::fmt;

/// A point in pixel coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl PixelPoint {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are zero.
    #[inline]
    #[must_use]
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Component-wise sum.
    #[inline]
    #[must_use]
    pub const fn offset(self, by: Self) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    /// Component-wise difference.
    #[inline]
    #[must_use]
    pub const fn delta_to(self, other: Self) -> Self {
        Self::new(other.x - self.x, other.y - self.y)
    }

    /// Sum of the absolute coordinates.
    #[inline]
    #[must_use]
    pub const fn manhattan_length(self) -> u32 {
        self.x.unsigned_abs() + self.y.unsigned_abs()
    }

    /// Converts to a floating-point point.
    #[inline]
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl fmt::Debug for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size in pixels.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelSize {
    /// The empty size.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a size.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Converts to a floating-point size.
    #[inline]
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Size {
        kurbo::Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl fmt::Debug for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelRect {
    /// Creates a rect from its top-left corner and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rect from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(origin: PixelPoint, size: PixelSize) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Creates a rect at the origin covering `size`.
    #[inline]
    #[must_use]
    pub const fn from_size(size: PixelSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Width and height.
    #[inline]
    #[must_use]
    pub const fn size(self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// One past the right edge.
    #[inline]
    #[must_use]
    pub const fn right(self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// One past the bottom edge.
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns `true` if the rect covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the rect moved by `by`.
    #[inline]
    #[must_use]
    pub const fn translated(self, by: PixelPoint) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    /// Returns `true` if `other` lies entirely inside this rect.
    #[must_use]
    pub fn contains_rect(self, other: Self) -> bool {
        other.is_empty()
            || (i64::from(other.x) >= i64::from(self.x)
                && i64::from(other.y) >= i64::from(self.y)
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Returns the overlap of two rects, or an empty rect at `self`'s origin.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= i64::from(x0) || y1 <= i64::from(y0) {
            return Self::new(self.x, self.y, 0, 0);
        }
        Self::new(x0, y0, span(x0, x1), span(y0, y1))
    }

    /// Returns the smallest rect covering both. Empty rects are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Self::new(x0, y0, span(x0, x1), span(y0, y1))
    }

    /// Converts to a floating-point rect.
    #[inline]
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::from_origin_size(self.origin().to_kurbo(), self.size().to_kurbo())
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "span of two i32 edges always fits in u32"
)]
fn span(start: i32, end: i64) -> u32 {
    (end - i64::from(start)) as u32
}

impl fmt::Debug for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A set of pixel rects.
///
/// Rects are kept in insertion order and may overlap; operations that only
/// need the covered area (bounding box, scrolling, blitting) treat the region
/// as their union. Empty rects are dropped on insertion.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    rects: Vec<PixelRect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering one rect.
    #[must_use]
    pub fn from_rect(rect: PixelRect) -> Self {
        let mut region = Self::new();
        region.push(rect);
        region
    }

    /// Adds a rect to the region.
    pub fn push(&mut self, rect: PixelRect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The rects making up the region.
    #[must_use]
    pub fn rects(&self) -> &[PixelRect] {
        &self.rects
    }

    /// Number of rects.
    #[must_use]
    pub fn rect_count(&self) -> usize {
        self.rects.len()
    }

    /// The smallest rect covering the whole region.
    #[must_use]
    pub fn bounding_rect(&self) -> PixelRect {
        self.rects
            .iter()
            .copied()
            .fold(PixelRect::default(), PixelRect::union)
    }

    /// Moves every rect by `by`.
    pub fn translate(&mut self, by: PixelPoint) {
        for rect in &mut self.rects {
            *rect = rect.translated(by);
        }
    }

    /// Returns a copy moved by `by`.
    #[must_use]
    pub fn translated(&self, by: PixelPoint) -> Self {
        let mut region = self.clone();
        region.translate(by);
        region
    }

    /// Returns the part of the region inside `clip`.
    #[must_use]
    pub fn intersected(&self, clip: PixelRect) -> Self {
        self.rects
            .iter()
            .map(|rect| rect.intersect(clip))
            .collect()
    }
}

impl FromIterator<PixelRect> for Region {
    fn from_iter<I: IntoIterator<Item = PixelRect>>(iter: I) -> Self {
        let mut region = Self::new();
        for rect in iter {
            region.push(rect);
        }
        region
    }
}

impl From<PixelRect> for Region {
    fn from(rect: PixelRect) -> Self {
        Self::from_rect(rect)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.rects).finish()
    }
}
