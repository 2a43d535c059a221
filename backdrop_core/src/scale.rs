// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical-to-native coordinate conversion.
//!
//! Window sizes, paint regions and scroll deltas arrive in logical pixels.
//! The backing buffer lives in native pixels: logical pixels multiplied by the
//! *effective* device-pixel ratio (see [`effective_ratio`]).
//!
//! Every conversion multiplies and then rounds with ties to even. Rects scale
//! their origin and their size independently, so the far edge of a scaled
//! rect can differ by one pixel from the scaled far edge. Callers that combine
//! independently scaled values (for example a region and an offset) must
//! correct for that; see
//! [`SurfaceCompositor::flush`](crate::compositor::SurfaceCompositor::flush).

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::geometry::{PixelPoint, PixelRect, PixelSize, Region};
use crate::util::{round_ties_even, round_to_i32};

/// Returns the ratio the backing buffer is scaled by.
///
/// With `downscale` the window's ratio is rounded up to the next integer, so
/// the buffer is rendered at an integer scale and the platform scales it down
/// on presentation. Otherwise fractional ratios are used as they are.
///
/// Non-finite or non-positive ratios are treated as `1.0`.
#[must_use]
pub fn effective_ratio(window_ratio: f64, downscale: bool) -> f64 {
    if !is_valid_ratio(window_ratio) {
        return 1.0;
    }
    if downscale {
        window_ratio.ceil()
    } else {
        window_ratio
    }
}

/// Returns `true` if `ratio` is finite and positive.
#[inline]
#[must_use]
pub fn is_valid_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 0.0
}

/// Returns `true` if `factor` is exactly one, meaning logical and native
/// pixels coincide.
#[inline]
#[must_use]
pub fn is_identity(factor: f64) -> bool {
    factor == 1.0
}

/// Scales a scalar without rounding.
#[inline]
#[must_use]
pub fn to_native_scalar(v: i32, factor: f64) -> f64 {
    f64::from(v) * factor
}

/// Returns `true` if `v` has no fractional part.
#[inline]
#[must_use]
pub fn is_integral(v: f64) -> bool {
    v.is_finite() && v.floor() == v
}

/// Scales a size.
#[must_use]
pub fn to_native_size(size: PixelSize, factor: f64) -> PixelSize {
    PixelSize::new(scale_extent(size.width, factor), scale_extent(size.height, factor))
}

/// Converts a native size back to logical pixels.
///
/// Recovers the original logical size to within one native pixel.
#[must_use]
pub fn from_native_size(size: PixelSize, factor: f64) -> PixelSize {
    to_native_size(size, 1.0 / factor)
}

/// Scales a point.
#[must_use]
pub fn to_native_point(point: PixelPoint, factor: f64) -> PixelPoint {
    PixelPoint::new(
        round_to_i32(to_native_scalar(point.x, factor)),
        round_to_i32(to_native_scalar(point.y, factor)),
    )
}

/// Scales a rect's origin and size independently.
#[must_use]
pub fn to_native_rect(rect: PixelRect, factor: f64) -> PixelRect {
    PixelRect::from_origin_size(
        to_native_point(rect.origin(), factor),
        to_native_size(rect.size(), factor),
    )
}

/// Scales every rect of a region.
#[must_use]
pub fn to_native_region(region: &Region, factor: f64) -> Region {
    if is_identity(factor) {
        return region.clone();
    }
    region
        .rects()
        .iter()
        .map(|rect| to_native_rect(*rect, factor))
        .collect()
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "extents are non-negative and clamped to the u32 range"
)]
fn scale_extent(v: u32, factor: f64) -> u32 {
    round_ties_even(f64::from(v) * factor).clamp(0.0, f64::from(u32::MAX)) as u32
}
