// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place block moves inside an image.

use backdrop_core::geometry::{PixelPoint, PixelRect};
use backdrop_core::image::Image;

/// Moves the pixels of `rect` by `offset` within `image`.
///
/// The source is clipped so that both it and its destination lie inside the
/// image; pixels the move uncovers keep their old values. Rows are copied
/// bottom-to-top when the destination is below the source so that no row is
/// overwritten before it has been read. A purely horizontal move shorter
/// than the rect's width overlaps itself within each row and goes through
/// [`slice::copy_within`]; every other move copies between disjoint ranges.
pub fn scroll_rect_in_image(image: &mut Image, rect: PixelRect, offset: PixelPoint) {
    let bounds = image.rect();
    let source = rect
        .intersect(bounds)
        .intersect(bounds.translated(PixelPoint::new(-offset.x, -offset.y)));
    if source.is_empty() {
        return;
    }
    let dest = source.translated(offset);

    let bpp = image.format().bytes_per_pixel();
    let stride = image.stride();
    let bytes = source.width as usize * bpp;
    let rows = source.height as usize;
    let byte_offset = |r: PixelRect, row: usize| -> usize {
        // Both rects are inside the image, so their coordinates are not
        // negative.
        (r.y.unsigned_abs() as usize + row) * stride + r.x.unsigned_abs() as usize * bpp
    };
    let overlapping = offset.y == 0 && offset.x.unsigned_abs() < source.width;
    let bottom_up = source.y < dest.y;

    let data = image.data_mut();
    for i in 0..rows {
        let row = if bottom_up { rows - 1 - i } else { i };
        let from = byte_offset(source, row);
        let to = byte_offset(dest, row);
        if overlapping {
            data.copy_within(from..from + bytes, to);
        } else {
            copy_disjoint(data, from, to, bytes);
        }
    }
}

/// Copies `len` bytes from `from` to `to`; the ranges must not overlap.
fn copy_disjoint(data: &mut [u8], from: usize, to: usize, len: usize) {
    if from < to {
        let (head, tail) = data.split_at_mut(to);
        tail[..len].copy_from_slice(&head[from..from + len]);
    } else {
        let (head, tail) = data.split_at_mut(from);
        head[to..to + len].copy_from_slice(&tail[..len]);
    }
}
