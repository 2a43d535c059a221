// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The DPI-aware backing store of a top-level window.
//!
//! A [`SurfaceCompositor`] sits between paint code, which works in logical
//! pixels, and a [`PlatformSurface`], which works in native pixels. It keeps
//! the surface sized to the window, scales every region, offset and delta it
//! forwards, and checks that flushes target windows it actually backs.
//!
//! # Paint cycle
//!
//! ```rust,ignore
//! compositor.begin_paint(&dirty);
//! if let Surface::Raster(target) = compositor.paint_device() {
//!     let mut painter = Painter::new(target);
//!     draw(&mut painter);
//! }
//! compositor.end_paint();
//! compositor.flush(&dirty, None, PixelPoint::ORIGIN);
//! ```
//!
//! The compositor is single-threaded; it is driven from the window's UI
//! thread and holds no locks.

use alloc::boxed::Box;
use core::fmt;

use crate::backend::{GpuTarget, PaintDevice, PlatformSurface};
use crate::config::CompositorConfig;
use crate::geometry::{PixelPoint, PixelSize, Region};
use crate::image::{Image, ImageView, RasterTarget};
use crate::scale;
use crate::trace::{
    BeginPaintEvent, DiagnosticEvent, DiagnosticKind, EndPaintEvent, FlushEvent, ResizeEvent,
    ScrollEvent, TraceSink, Tracer,
};
use crate::util::{debug_panic, round_to_i32};
use crate::window::{Window, WindowId};

/// What paint code draws into between
/// [`begin_paint`](SurfaceCompositor::begin_paint) and
/// [`end_paint`](SurfaceCompositor::end_paint).
#[derive(Debug)]
pub enum Surface<'a> {
    /// The surface's image, tagged with the effective device-pixel ratio.
    Raster(RasterTarget<'a>),
    /// A GPU-only target.
    Gpu(GpuTarget),
}

type SurfaceFactory<W, S> = Box<dyn FnMut(&W) -> S>;

/// Backing store for one top-level window.
///
/// The platform surface is created through the factory on first use and
/// owned exclusively by the compositor.
pub struct SurfaceCompositor<W: Window, S: PlatformSurface> {
    window: W,
    config: CompositorConfig,
    factory: SurfaceFactory<W, S>,
    surface: Option<S>,
    logical_size: PixelSize,
    native_size: PixelSize,
    static_contents: Region,
    view: Option<ImageView>,
    in_paint: bool,
    paint_index: u64,
    warned_static_contents: bool,
    warned_invalid_ratio: bool,
    tracer: Tracer,
}

impl<W: Window, S: PlatformSurface> fmt::Debug for SurfaceCompositor<W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceCompositor")
            .field("window", &self.window.id())
            .field("config", &self.config)
            .field("created", &self.surface.is_some())
            .field("logical_size", &self.logical_size)
            .field("native_size", &self.native_size)
            .field("static_contents", &self.static_contents)
            .field("view", &self.view)
            .field("paint_index", &self.paint_index)
            .finish_non_exhaustive()
    }
}

/// Creates the surface on first use.
fn ensure_surface<'s, W, S>(
    surface: &'s mut Option<S>,
    factory: &mut SurfaceFactory<W, S>,
    window: &W,
) -> &'s mut S
where
    W: Window,
    S: PlatformSurface,
{
    surface.get_or_insert_with(|| {
        tracing::debug!(window = ?window.id(), "creating platform surface");
        factory(window)
    })
}

impl<W: Window, S: PlatformSurface> SurfaceCompositor<W, S> {
    /// Creates a compositor for `window`.
    ///
    /// `factory` builds the platform surface the first time one is needed,
    /// and again after [`release_surface`](Self::release_surface).
    #[must_use]
    pub fn new(window: W, config: CompositorConfig, factory: impl FnMut(&W) -> S + 'static) -> Self {
        let logical_size = window.size();
        let ratio = scale::effective_ratio(window.device_pixel_ratio(), config.downscale);
        Self {
            native_size: scale::to_native_size(logical_size, ratio),
            logical_size,
            window,
            config,
            factory: Box::new(factory),
            surface: None,
            static_contents: Region::new(),
            view: None,
            in_paint: false,
            paint_index: 0,
            warned_static_contents: false,
            warned_invalid_ratio: false,
            tracer: Tracer::none(),
        }
    }

    /// Routes trace events and diagnostics to `sink`.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// The window this compositor backs.
    #[must_use]
    pub fn window(&self) -> &W {
        &self.window
    }

    /// The configuration captured at creation.
    #[must_use]
    pub fn config(&self) -> CompositorConfig {
        self.config
    }

    /// Last requested size in logical pixels.
    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.logical_size
    }

    /// Last requested size in native pixels.
    #[must_use]
    pub fn native_size(&self) -> PixelSize {
        self.native_size
    }

    /// The ratio between native and logical pixels right now.
    #[must_use]
    pub fn effective_ratio(&self) -> f64 {
        scale::effective_ratio(self.window.device_pixel_ratio(), self.config.downscale)
    }

    /// [`effective_ratio`](Self::effective_ratio), warning the first time the
    /// window reports an unusable ratio.
    fn current_ratio(&mut self) -> f64 {
        let window_ratio = self.window.device_pixel_ratio();
        if !scale::is_valid_ratio(window_ratio) && !self.warned_invalid_ratio {
            let window = self.window.id();
            tracing::warn!(?window, window_ratio, "invalid device-pixel ratio, using 1.0");
            self.warned_invalid_ratio = true;
        }
        scale::effective_ratio(window_ratio, self.config.downscale)
    }

    /// Returns `true` once the platform surface exists.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.surface.is_some()
    }

    /// The platform surface, if created.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// The platform surface, if created, mutably.
    #[must_use]
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Destroys the platform surface, returning it.
    ///
    /// The next operation that needs a surface creates a new one.
    pub fn release_surface(&mut self) -> Option<S> {
        self.view = None;
        self.in_paint = false;
        self.surface.take()
    }

    /// Consumes the compositor, returning the platform surface if it was
    /// created.
    #[must_use]
    pub fn into_surface(self) -> Option<S> {
        self.surface
    }

    /// The DPI view built by the last [`begin_paint`](Self::begin_paint),
    /// if the surface is a raster image painted at a ratio other than one.
    #[must_use]
    pub fn image_view(&self) -> Option<ImageView> {
        self.view
    }

    /// Number of paints begun so far.
    #[must_use]
    pub fn paint_count(&self) -> u64 {
        self.paint_index
    }

    /// Copies the surface contents into a new image, if the surface can.
    #[must_use]
    pub fn to_image(&self) -> Option<Image> {
        self.surface.as_ref().and_then(PlatformSurface::to_image)
    }

    /// Prepares `region` (logical pixels) for painting.
    ///
    /// Resizes the surface first if the window's size or ratio changed since
    /// the last resize.
    pub fn begin_paint(&mut self, region: &Region) {
        let ratio = self.current_ratio();
        let logical = self.window.size();
        let native = scale::to_native_size(logical, ratio);
        let current = ensure_surface(&mut self.surface, &mut self.factory, &self.window).size();
        if current != native || logical != self.logical_size {
            self.resize(logical);
        }
        self.native_size = native;

        let native_region = scale::to_native_region(region, ratio);
        let surface = ensure_surface(&mut self.surface, &mut self.factory, &self.window);
        surface.begin_paint(&native_region);
        self.in_paint = true;
        self.paint_index += 1;

        let mut view_rebuilt = false;
        match surface.paint_device() {
            PaintDevice::Image(image) if !scale::is_identity(ratio) => {
                let stale = self
                    .view
                    .is_none_or(|view| !view.matches(image) || view.device_pixel_ratio != ratio);
                if stale {
                    let view = ImageView::of(image, ratio);
                    tracing::trace!(?view, "rebuilding image view");
                    self.view = Some(view);
                    view_rebuilt = true;
                }
            }
            _ => self.view = None,
        }

        self.tracer.begin_paint(&BeginPaintEvent {
            paint_index: self.paint_index,
            window: self.window.id(),
            native_bounds: native_region.bounding_rect(),
            device_pixel_ratio: ratio,
            view_rebuilt,
        });
    }

    /// The target paint code draws into.
    ///
    /// Only meaningful between [`begin_paint`](Self::begin_paint) and
    /// [`end_paint`](Self::end_paint); calling it elsewhere is reported and
    /// the device is returned anyway.
    pub fn paint_device(&mut self) -> Surface<'_> {
        if !self.in_paint {
            let window = self.window.id();
            tracing::warn!(?window, "paint device requested outside begin_paint/end_paint");
            self.tracer.diagnostic(&DiagnosticEvent {
                kind: DiagnosticKind::PaintDeviceOutsidePaint,
                window,
            });
        }
        let view = self.view;
        match ensure_surface(&mut self.surface, &mut self.factory, &self.window).paint_device() {
            PaintDevice::Image(image) => {
                let ratio = view
                    .filter(|view| view.matches(image))
                    .map_or(1.0, |view| view.device_pixel_ratio);
                Surface::Raster(RasterTarget::new(image, ratio))
            }
            PaintDevice::Gpu(target) => Surface::Gpu(target),
        }
    }

    /// Finishes the paint started by [`begin_paint`](Self::begin_paint).
    ///
    /// A painter still active on the surface image is reported; the platform
    /// end-paint runs regardless.
    pub fn end_paint(&mut self) {
        let window = self.window.id();
        let surface = ensure_surface(&mut self.surface, &mut self.factory, &self.window);
        if let PaintDevice::Image(image) = surface.paint_device() {
            if image.painting_active() {
                tracing::warn!(?window, "end_paint called while a painter is still active");
                self.tracer.diagnostic(&DiagnosticEvent {
                    kind: DiagnosticKind::ActivePainterAtEndPaint,
                    window,
                });
            }
        }
        surface.end_paint();
        self.in_paint = false;
        self.tracer.end_paint(&EndPaintEvent {
            paint_index: self.paint_index,
            window,
        });
    }

    /// Presents `region` (logical pixels) on `window`.
    ///
    /// `None` flushes to the compositor's own window. Any other window must
    /// be a non-transient descendant of it; `offset` is that window's
    /// position inside the compositor's window. Flushing to a foreign window
    /// or a window without a platform handle is reported and does nothing.
    pub fn flush(&mut self, region: &Region, window: Option<&W>, offset: PixelPoint) {
        let ratio = self.current_ratio();
        let own = &self.window;
        let target = window.unwrap_or(own);
        let target_id = target.id();
        if target_id != own.id() && !own.is_ancestor_of(target) {
            tracing::warn!(
                window = ?target_id,
                backing = ?own.id(),
                "flush to a window this backing store does not own"
            );
            self.tracer.diagnostic(&DiagnosticEvent {
                kind: DiagnosticKind::ForeignWindow,
                window: target_id,
            });
            return;
        }
        if !target.has_handle() {
            tracing::warn!(window = ?target_id, "flush to a window without a platform handle");
            self.tracer.diagnostic(&DiagnosticEvent {
                kind: DiagnosticKind::MissingHandle,
                window: target_id,
            });
            return;
        }

        let mut native_region = scale::to_native_region(region, ratio);
        let native_offset = scale::to_native_point(offset, ratio);
        let mut correction = PixelPoint::ORIGIN;
        if !offset.is_origin() && !region.is_empty() {
            // The region and the offset were rounded separately; the platform
            // must see their sum where a single rounding puts it.
            let combined = scale::to_native_point(region.bounding_rect().origin().offset(offset), ratio);
            let separate = native_region.bounding_rect().origin().offset(native_offset);
            let delta = separate.delta_to(combined);
            correction = PixelPoint::new(delta.x.clamp(-1, 1), delta.y.clamp(-1, 1));
            if correction != delta {
                debug_panic!(
                    "native flush offset is off by {delta:?}, more than one pixel at ratio {ratio}"
                );
                self.tracer.diagnostic(&DiagnosticEvent {
                    kind: DiagnosticKind::RoundingDiscrepancy,
                    window: target_id,
                });
            }
            native_region.translate(correction);
        }

        let surface = ensure_surface(&mut self.surface, &mut self.factory, own);
        surface.flush(target, &native_region, native_offset);
        self.tracer.flush(&FlushEvent {
            window: target_id,
            native_bounds: native_region.bounding_rect(),
            native_offset,
            correction,
        });
    }

    /// Records `size` (logical pixels) and resizes the platform surface if
    /// the native size changed.
    ///
    /// The static contents are passed along in native pixels so the surface
    /// can keep those pixels.
    pub fn resize(&mut self, size: PixelSize) {
        let ratio = self.current_ratio();
        self.logical_size = size;
        self.native_size = scale::to_native_size(size, ratio);
        let native_size = self.native_size;

        let surface = ensure_surface(&mut self.surface, &mut self.factory, &self.window);
        let reallocated = surface.size() != native_size;
        if reallocated {
            tracing::debug!(logical = ?size, native = ?native_size, ratio, "resizing backing store");
            let native_static = scale::to_native_region(&self.static_contents, ratio);
            surface.resize(native_size, &native_static);
        }
        self.tracer.resize(&ResizeEvent {
            window: self.window.id(),
            logical_size: size,
            native_size,
            reallocated,
        });
    }

    /// Moves the contents of `area` (logical pixels) by `(dx, dy)`.
    ///
    /// Returns `false` without touching the surface when either delta does
    /// not land on a whole native pixel, since a block copy cannot express
    /// the fraction. It also returns `false` when the surface is not sized
    /// for the window's current size and ratio: the next
    /// [`begin_paint`](Self::begin_paint) reallocates it, so scrolled pixels
    /// would not survive. Otherwise returns the platform's result.
    pub fn scroll(&mut self, area: &Region, dx: i32, dy: i32) -> bool {
        let ratio = self.current_ratio();
        let native_dx = scale::to_native_scalar(dx, ratio);
        let native_dy = scale::to_native_scalar(dy, ratio);
        let expected = scale::to_native_size(self.window.size(), ratio);

        let accepted = if !scale::is_integral(native_dx) || !scale::is_integral(native_dy) {
            tracing::debug!(dx, dy, ratio, "scroll rejected: fractional native delta");
            false
        } else {
            let surface = ensure_surface(&mut self.surface, &mut self.factory, &self.window);
            if surface.size() == expected {
                let native_area = scale::to_native_region(area, ratio);
                surface.scroll(&native_area, round_to_i32(native_dx), round_to_i32(native_dy))
            } else {
                tracing::debug!(
                    surface = ?surface.size(),
                    ?expected,
                    "scroll rejected: backing store is stale"
                );
                false
            }
        };

        self.tracer.scroll(&ScrollEvent {
            window: self.window.id(),
            bounds: area.bounding_rect(),
            dx,
            dy,
            accepted,
        });
        accepted
    }

    /// Sets the region (logical pixels) whose contents survive a resize.
    ///
    /// A surface that cannot preserve contents is reported once; the region
    /// is recorded either way.
    pub fn set_static_contents(&mut self, region: Region) {
        let surface = ensure_surface(&mut self.surface, &mut self.factory, &self.window);
        if !region.is_empty()
            && !surface.capabilities().static_contents
            && !self.warned_static_contents
        {
            let window = self.window.id();
            tracing::warn!(?window, "platform surface does not support static contents");
            self.tracer.diagnostic(&DiagnosticEvent {
                kind: DiagnosticKind::StaticContentsUnsupported,
                window,
            });
            self.warned_static_contents = true;
        }
        self.static_contents = region;
    }

    /// The region whose contents survive a resize.
    #[must_use]
    pub fn static_contents(&self) -> &Region {
        &self.static_contents
    }

    /// Returns `true` if a static-contents region is set.
    #[must_use]
    pub fn has_static_contents(&self) -> bool {
        !self.static_contents.is_empty()
    }

    /// Identity of the compositor's window.
    #[must_use]
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::backend::SurfaceCapabilities;
    use crate::geometry::PixelRect;
    use crate::image::PixelFormat;
    use crate::painter::Painter;

    // -- test window ---------------------------------------------------------

    struct WindowState {
        id: WindowId,
        size: Cell<PixelSize>,
        ratio: Cell<f64>,
        handle: Cell<bool>,
        parent: Option<TestWindow>,
        transient_parent: Option<TestWindow>,
    }

    #[derive(Clone)]
    struct TestWindow(Rc<WindowState>);

    impl TestWindow {
        fn top(id: u32, size: PixelSize, ratio: f64) -> Self {
            Self(Rc::new(WindowState {
                id: WindowId(id),
                size: Cell::new(size),
                ratio: Cell::new(ratio),
                handle: Cell::new(true),
                parent: None,
                transient_parent: None,
            }))
        }

        fn child_of(&self, id: u32) -> Self {
            Self(Rc::new(WindowState {
                id: WindowId(id),
                size: Cell::new(PixelSize::new(10, 10)),
                ratio: Cell::new(self.0.ratio.get()),
                handle: Cell::new(true),
                parent: Some(self.clone()),
                transient_parent: None,
            }))
        }

        fn transient_of(&self, id: u32) -> Self {
            Self(Rc::new(WindowState {
                id: WindowId(id),
                size: Cell::new(PixelSize::new(10, 10)),
                ratio: Cell::new(self.0.ratio.get()),
                handle: Cell::new(true),
                parent: None,
                transient_parent: Some(self.clone()),
            }))
        }
    }

    impl Window for TestWindow {
        fn id(&self) -> WindowId {
            self.0.id
        }

        fn size(&self) -> PixelSize {
            self.0.size.get()
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.0.ratio.get()
        }

        fn has_handle(&self) -> bool {
            self.0.handle.get()
        }

        fn parent(&self) -> Option<Self> {
            self.0.parent.clone()
        }
    }

    // -- mock surface --------------------------------------------------------

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Resize(PixelSize, Region),
        BeginPaint(Region),
        EndPaint,
        Flush(WindowId, Region, PixelPoint),
        Scroll(Region, i32, i32),
    }

    type CallLog = Rc<RefCell<Vec<Call>>>;

    struct MockSurface {
        log: CallLog,
        size: PixelSize,
        image: Option<Image>,
        static_contents: bool,
        scroll_result: bool,
    }

    impl PlatformSurface for MockSurface {
        fn size(&self) -> PixelSize {
            self.size
        }

        fn resize(&mut self, size: PixelSize, static_contents: &Region) {
            self.log
                .borrow_mut()
                .push(Call::Resize(size, static_contents.clone()));
            self.size = size;
            if self.image.is_some() {
                self.image = Some(Image::new(size, PixelFormat::Argb32Premultiplied));
            }
        }

        fn begin_paint(&mut self, region: &Region) {
            self.log.borrow_mut().push(Call::BeginPaint(region.clone()));
        }

        fn end_paint(&mut self) {
            self.log.borrow_mut().push(Call::EndPaint);
        }

        fn paint_device(&mut self) -> PaintDevice<'_> {
            match &mut self.image {
                Some(image) => PaintDevice::Image(image),
                None => PaintDevice::Gpu(GpuTarget {
                    id: 7,
                    size: self.size,
                }),
            }
        }

        fn flush(&mut self, window: &dyn Window, region: &Region, offset: PixelPoint) {
            self.log
                .borrow_mut()
                .push(Call::Flush(window.id(), region.clone(), offset));
        }

        fn scroll(&mut self, area: &Region, dx: i32, dy: i32) -> bool {
            self.log
                .borrow_mut()
                .push(Call::Scroll(area.clone(), dx, dy));
            self.scroll_result
        }

        fn capabilities(&self) -> SurfaceCapabilities {
            SurfaceCapabilities {
                static_contents: self.static_contents,
            }
        }
    }

    #[derive(Default)]
    struct DiagnosticLog {
        kinds: Vec<DiagnosticKind>,
    }

    impl TraceSink for DiagnosticLog {
        fn on_diagnostic(&mut self, e: &DiagnosticEvent) {
            self.kinds.push(e.kind);
        }
    }

    struct Harness {
        compositor: SurfaceCompositor<TestWindow, MockSurface>,
        log: CallLog,
        diagnostics: Rc<RefCell<DiagnosticLog>>,
        created: Rc<Cell<u32>>,
    }

    impl Harness {
        fn calls(&self) -> Vec<Call> {
            self.log.borrow().clone()
        }

        fn diagnostics(&self) -> Vec<DiagnosticKind> {
            self.diagnostics.borrow().kinds.clone()
        }
    }

    fn harness(window: &TestWindow, config: CompositorConfig, raster: bool) -> Harness {
        harness_with(window, config, raster, false)
    }

    fn harness_with(
        window: &TestWindow,
        config: CompositorConfig,
        raster: bool,
        static_contents: bool,
    ) -> Harness {
        let log = CallLog::default();
        let created = Rc::new(Cell::new(0));
        let factory_log = log.clone();
        let factory_created = created.clone();
        let mut compositor = SurfaceCompositor::new(window.clone(), config, move |_: &TestWindow| {
            factory_created.set(factory_created.get() + 1);
            MockSurface {
                log: factory_log.clone(),
                size: PixelSize::ZERO,
                image: raster.then(|| Image::new(PixelSize::ZERO, PixelFormat::Argb32Premultiplied)),
                static_contents,
                scroll_result: true,
            }
        });
        let diagnostics = Rc::new(RefCell::new(DiagnosticLog::default()));
        compositor.set_trace_sink(Box::new(diagnostics.clone()));
        Harness {
            compositor,
            log,
            diagnostics,
            created,
        }
    }

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Region {
        Region::from_rect(PixelRect::new(x, y, w, h))
    }

    // -- tests ---------------------------------------------------------------

    #[test]
    fn surface_is_created_lazily() {
        let window = TestWindow::top(1, PixelSize::new(40, 30), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        assert!(!h.compositor.is_created());
        assert_eq!(h.created.get(), 0);

        h.compositor.resize(PixelSize::new(40, 30));
        h.compositor.begin_paint(&rect(0, 0, 40, 30));
        assert!(h.compositor.is_created());
        assert_eq!(h.created.get(), 1);

        let released = h.compositor.release_surface();
        assert!(released.is_some());
        h.compositor.begin_paint(&rect(0, 0, 4, 4));
        assert_eq!(h.created.get(), 2);
    }

    #[test]
    fn fractional_ratio_sizes_and_flush_offset() {
        let window = TestWindow::top(1, PixelSize::new(400, 300), 1.5);
        let mut h = harness(&window, CompositorConfig::new(), false);
        h.compositor.resize(PixelSize::new(400, 300));
        assert_eq!(h.compositor.native_size(), PixelSize::new(600, 450));

        h.compositor.flush(&rect(10, 10, 50, 50), None, PixelPoint::new(5, 5));
        let calls = h.calls();
        let Some(Call::Flush(id, region, offset)) = calls.last() else {
            panic!("expected a flush, got {calls:?}");
        };
        assert_eq!(*id, WindowId(1));
        assert_eq!(*offset, PixelPoint::new(8, 8));
        assert_eq!(region.rects(), &[PixelRect::new(14, 14, 75, 75)]);
        let top_left = region.bounding_rect().origin().offset(*offset);
        assert_eq!(top_left, PixelPoint::new(22, 22));
    }

    #[test]
    fn downscale_rounds_ratio_up() {
        let window = TestWindow::top(1, PixelSize::new(400, 300), 1.5);
        let mut h = harness(&window, CompositorConfig::downscaled(), false);
        h.compositor.resize(PixelSize::new(400, 300));
        assert_eq!(h.compositor.effective_ratio(), 2.0);
        assert_eq!(h.compositor.native_size(), PixelSize::new(800, 600));
        assert_eq!(
            h.calls(),
            vec![Call::Resize(PixelSize::new(800, 600), Region::new())]
        );
    }

    #[test]
    fn resize_to_same_size_reallocates_once() {
        let window = TestWindow::top(1, PixelSize::new(100, 80), 1.25);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.resize(PixelSize::new(100, 80));
        h.compositor.resize(PixelSize::new(100, 80));
        let resizes = h
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Resize(..)))
            .count();
        assert_eq!(resizes, 1);
        assert_eq!(h.compositor.size(), PixelSize::new(100, 80));
    }

    #[test]
    fn begin_paint_follows_window_size_and_ratio() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();
        window.0.ratio.set(2.0);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();

        assert_eq!(
            h.calls(),
            vec![
                Call::Resize(PixelSize::new(100, 100), Region::new()),
                Call::BeginPaint(rect(0, 0, 10, 10)),
                Call::EndPaint,
                Call::Resize(PixelSize::new(200, 200), Region::new()),
                Call::BeginPaint(rect(0, 0, 20, 20)),
                Call::EndPaint,
            ]
        );
        assert_eq!(h.compositor.native_size(), PixelSize::new(200, 200));
        assert_eq!(h.compositor.paint_count(), 2);
    }

    #[test]
    fn image_view_is_rebuilt_only_on_change() {
        let window = TestWindow::top(1, PixelSize::new(20, 20), 2.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 20, 20));
        h.compositor.end_paint();
        let first = h.compositor.image_view().expect("raster surface at 2x has a view");
        assert_eq!(first.size, PixelSize::new(40, 40));
        assert_eq!(first.device_pixel_ratio, 2.0);

        h.compositor.begin_paint(&rect(0, 0, 5, 5));
        h.compositor.end_paint();
        assert_eq!(h.compositor.image_view(), Some(first));

        window.0.size.set(PixelSize::new(30, 20));
        h.compositor.begin_paint(&rect(0, 0, 5, 5));
        h.compositor.end_paint();
        let second = h.compositor.image_view().expect("view after resize");
        assert_ne!(second.generation, first.generation);
        assert_eq!(second.size, PixelSize::new(60, 40));

        window.0.ratio.set(1.0);
        h.compositor.begin_paint(&rect(0, 0, 5, 5));
        h.compositor.end_paint();
        assert_eq!(h.compositor.image_view(), None);
    }

    #[test]
    fn gpu_surface_has_no_view() {
        let window = TestWindow::top(1, PixelSize::new(20, 20), 2.0);
        let mut h = harness(&window, CompositorConfig::new(), false);
        h.compositor.begin_paint(&rect(0, 0, 20, 20));
        assert!(h.compositor.image_view().is_none());
        assert!(matches!(
            h.compositor.paint_device(),
            Surface::Gpu(GpuTarget { id: 7, .. })
        ));
        h.compositor.end_paint();
    }

    #[test]
    fn paint_device_carries_effective_ratio() {
        let window = TestWindow::top(1, PixelSize::new(40, 30), 1.5);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 40, 30));
        let Surface::Raster(target) = h.compositor.paint_device() else {
            panic!("raster surface expected");
        };
        assert_eq!(target.device_pixel_ratio(), 1.5);
        assert_eq!(target.image().size(), PixelSize::new(60, 45));
        assert_eq!(target.logical_size(), PixelSize::new(40, 30));
        h.compositor.end_paint();
        assert!(h.diagnostics().is_empty());
    }

    #[test]
    fn paint_device_outside_paint_is_reported() {
        let window = TestWindow::top(1, PixelSize::new(4, 4), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        assert!(matches!(h.compositor.paint_device(), Surface::Raster(_)));
        assert_eq!(
            h.diagnostics(),
            vec![DiagnosticKind::PaintDeviceOutsidePaint]
        );
    }

    #[test]
    fn end_paint_reports_leaked_painter() {
        let window = TestWindow::top(1, PixelSize::new(8, 8), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 8, 8));
        if let Surface::Raster(target) = h.compositor.paint_device() {
            core::mem::forget(Painter::new(target));
        }
        h.compositor.end_paint();
        assert_eq!(
            h.diagnostics(),
            vec![DiagnosticKind::ActivePainterAtEndPaint]
        );
        assert_eq!(h.calls().last(), Some(&Call::EndPaint));
    }

    #[test]
    fn closed_painter_is_not_reported() {
        let window = TestWindow::top(1, PixelSize::new(8, 8), 2.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 8, 8));
        if let Surface::Raster(target) = h.compositor.paint_device() {
            let mut painter = Painter::new(target);
            painter.fill(crate::image::Color::WHITE);
        }
        h.compositor.end_paint();
        assert!(h.diagnostics().is_empty());
    }

    #[test]
    fn flush_to_foreign_window_is_a_no_op() {
        let window = TestWindow::top(1, PixelSize::new(40, 40), 1.0);
        let other = TestWindow::top(2, PixelSize::new(40, 40), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.flush(&rect(0, 0, 10, 10), Some(&other), PixelPoint::ORIGIN);
        assert!(h.calls().is_empty());
        assert!(!h.compositor.is_created());
        assert_eq!(h.diagnostics(), vec![DiagnosticKind::ForeignWindow]);
    }

    #[test]
    fn flush_to_transient_child_is_foreign() {
        let window = TestWindow::top(1, PixelSize::new(40, 40), 1.0);
        let popup = window.transient_of(3);
        assert!(popup.0.transient_parent.is_some());
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.flush(&rect(0, 0, 10, 10), Some(&popup), PixelPoint::ORIGIN);
        assert!(h.calls().is_empty());
        assert_eq!(h.diagnostics(), vec![DiagnosticKind::ForeignWindow]);
    }

    #[test]
    fn flush_to_descendant_is_forwarded() {
        let window = TestWindow::top(1, PixelSize::new(40, 40), 2.0);
        let child = window.child_of(2);
        let grandchild = child.child_of(3);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor
            .flush(&rect(0, 0, 5, 5), Some(&grandchild), PixelPoint::new(3, 4));
        assert_eq!(
            h.calls(),
            vec![Call::Flush(
                WindowId(3),
                rect(0, 0, 10, 10),
                PixelPoint::new(6, 8)
            )]
        );
        assert!(h.diagnostics().is_empty());
    }

    #[test]
    fn flush_without_handle_is_a_no_op() {
        let window = TestWindow::top(1, PixelSize::new(40, 40), 1.0);
        let child = window.child_of(2);
        child.0.handle.set(false);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.flush(&rect(0, 0, 10, 10), Some(&child), PixelPoint::ORIGIN);
        assert!(h.calls().is_empty());
        assert_eq!(h.diagnostics(), vec![DiagnosticKind::MissingHandle]);
    }

    #[test]
    fn flush_corrections_stay_within_one_pixel() {
        for ratio in [1.25, 1.5, 1.75, 2.25, 2.5] {
            let window = TestWindow::top(1, PixelSize::new(200, 200), ratio);
            let child = window.child_of(2);
            let mut h = harness(&window, CompositorConfig::new(), false);
            for i in 0..20 {
                let region = rect(i, 2 * i + 1, 7, 9);
                let offset = PixelPoint::new(3 * i + 1, i);
                h.compositor.flush(&region, Some(&child), offset);
                let calls = h.calls();
                let Some(Call::Flush(_, native, native_offset)) = calls.last() else {
                    panic!("expected a flush");
                };
                let expected = scale::to_native_point(
                    region.bounding_rect().origin().offset(offset),
                    ratio,
                );
                assert_eq!(
                    native.bounding_rect().origin().offset(*native_offset),
                    expected,
                    "ratio {ratio}, step {i}"
                );
            }
        }
    }

    #[test]
    fn scroll_rejects_fractional_native_delta() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 1.5);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.resize(PixelSize::new(100, 100));
        let area = rect(0, 0, 10, 10);
        assert!(!h.compositor.scroll(&area, 1, 0));
        assert!(!h.compositor.scroll(&area, 2, 3));
        assert_eq!(h.calls().len(), 1, "only the resize reached the surface");

        assert!(h.compositor.scroll(&area, 2, -4));
        assert_eq!(
            h.calls().last(),
            Some(&Call::Scroll(rect(0, 0, 15, 15), 3, -6))
        );
    }

    #[test]
    fn scroll_on_stale_backing_store_is_refused() {
        let window = TestWindow::top(1, PixelSize::new(10, 10), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();

        window.0.ratio.set(2.0);
        assert!(!h.compositor.scroll(&rect(0, 0, 10, 10), 0, -2));
        assert!(
            !h.calls().iter().any(|call| matches!(call, Call::Scroll(..))),
            "a buffer sized for the old ratio must not be scrolled"
        );

        // Once repainted at the new ratio, scrolling works again.
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();
        assert!(h.compositor.scroll(&rect(0, 0, 10, 10), 0, -2));
        assert_eq!(
            h.calls().last(),
            Some(&Call::Scroll(rect(0, 0, 20, 20), 0, -4))
        );
    }

    #[test]
    fn scroll_before_first_paint_is_refused() {
        let window = TestWindow::top(1, PixelSize::new(10, 10), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        assert!(!h.compositor.scroll(&rect(0, 0, 10, 10), 0, 1));
        assert!(h.calls().is_empty());
    }

    #[test]
    fn begin_paint_records_new_logical_size_when_native_size_is_unchanged() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 2.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();

        window.0.size.set(PixelSize::new(200, 200));
        window.0.ratio.set(1.0);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();

        assert_eq!(h.compositor.size(), PixelSize::new(200, 200));
        assert_eq!(h.compositor.native_size(), PixelSize::new(200, 200));
        let resizes = h
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Resize(..)))
            .count();
        assert_eq!(resizes, 1, "the buffer keeps its size");
    }

    #[test]
    fn invalid_ratio_falls_back_to_one_and_warns_once() {
        let window = TestWindow::top(1, PixelSize::new(10, 10), f64::NAN);
        let mut h = harness(&window, CompositorConfig::new(), true);
        assert!(!h.compositor.warned_invalid_ratio);
        h.compositor.begin_paint(&rect(0, 0, 10, 10));
        h.compositor.end_paint();
        assert!(h.compositor.warned_invalid_ratio);
        assert_eq!(h.compositor.effective_ratio(), 1.0);
        assert_eq!(h.compositor.native_size(), PixelSize::new(10, 10));
    }

    #[test]
    fn scroll_returns_platform_result() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        h.compositor.resize(PixelSize::new(100, 100));
        if let Some(surface) = h.compositor.surface_mut() {
            surface.scroll_result = false;
        }
        assert!(!h.compositor.scroll(&rect(0, 0, 10, 10), 1, 1));
        assert_eq!(h.calls().len(), 2);
    }

    #[test]
    fn static_contents_on_unsupported_surface_warns_once() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 1.0);
        let mut h = harness(&window, CompositorConfig::new(), true);
        assert!(!h.compositor.has_static_contents());
        h.compositor.set_static_contents(rect(0, 0, 10, 10));
        h.compositor.set_static_contents(rect(0, 0, 20, 20));
        assert!(h.compositor.has_static_contents());
        assert_eq!(h.compositor.static_contents(), &rect(0, 0, 20, 20));
        assert_eq!(
            h.diagnostics(),
            vec![DiagnosticKind::StaticContentsUnsupported]
        );
    }

    #[test]
    fn static_contents_are_passed_to_resize_in_native_pixels() {
        let window = TestWindow::top(1, PixelSize::new(100, 100), 2.0);
        let mut h = harness_with(&window, CompositorConfig::new(), true, true);
        h.compositor.set_static_contents(rect(1, 2, 3, 4));
        h.compositor.resize(PixelSize::new(50, 50));
        assert_eq!(
            h.calls(),
            vec![Call::Resize(PixelSize::new(100, 100), rect(2, 4, 6, 8))]
        );
        assert!(h.diagnostics().is_empty());
    }
}
