// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DPI-aware backing stores and relaxed atomic primitives.
//!
//! `backdrop_core` manages the off-screen pixel buffer behind a top-level
//! window: it keeps the buffer sized in native pixels while paint code works
//! in logical pixels, and mediates every paint, flush, scroll and resize
//! between the two. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Window (size, ratio, ancestry)
//!       │
//!       ▼
//!   SurfaceCompositor ── logical → native ──► PlatformSurface
//!       │   begin_paint / paint_device / end_paint      │
//!       │   flush / scroll / resize                     ▼
//!       └──────────── Surface::Raster(RasterTarget) ◄── Image
//! ```
//!
//! **[`compositor`]** — [`SurfaceCompositor`](compositor::SurfaceCompositor),
//! the backing store itself.
//!
//! **[`backend`]** — The [`PlatformSurface`](backend::PlatformSurface) trait
//! that platform backends implement.
//!
//! **[`scale`]** — Logical-to-native conversion with a single rounding rule.
//!
//! **[`geometry`]** — Integer points, sizes, rects and regions.
//!
//! **[`image`]** — Raster images, the DPI view descriptor, and raster
//! targets. **[`painter`]** draws rect fills into a target.
//!
//! **[`window`]** — The [`Window`](window::Window) contract the compositor
//! queries.
//!
//! **[`atomic`]** — Relaxed atomic cells for integers and pointers, with
//! explicit acquire/release variants. **[`refcount`]** builds a reference
//! count on top.
//!
//! **[`config`]** — [`CompositorConfig`](config::CompositorConfig), captured
//! once per compositor.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait, event types and
//! diagnostics, with a [`Tracer`](trace::Tracer) wrapper whose
//! per-operation methods compile away without the `trace` feature.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   [`CompositorConfig::from_env`](config::CompositorConfig::from_env).
//! - `trace` (disabled by default): Enables per-operation `Tracer` method
//!   bodies (one branch per call site). Diagnostics are always delivered.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod util;

pub mod atomic;
pub mod backend;
pub mod compositor;
pub mod config;
pub mod geometry;
pub mod image;
pub mod painter;
pub mod refcount;
pub mod scale;
pub mod trace;
pub mod window;
