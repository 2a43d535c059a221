// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window identification and the window contract.
//!
//! Windows are owned by the windowing layer; the compositor only queries
//! them. [`WindowId`] is a lightweight handle the platform assigns; core
//! treats it as opaque.

use core::fmt;

/// Identifies a top-level or child window.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WindowId(pub u32);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({})", self.0)
    }
}

/// A drawing surface the compositor paints for or flushes to.
///
/// Implementations are usually cheap handles (an index, an `Rc`) onto state
/// owned by the windowing layer.
pub trait Window {
    /// The window's identity.
    fn id(&self) -> WindowId;

    /// Current size in logical pixels.
    fn size(&self) -> crate::geometry::PixelSize;

    /// Ratio between native and logical pixels on the window's screen.
    fn device_pixel_ratio(&self) -> f64;

    /// Returns `true` if the platform window backing this handle exists.
    fn has_handle(&self) -> bool;

    /// The embedding parent, if any.
    ///
    /// Transient parents (the owner of a dialog or popup) are not parents in
    /// this sense and must not be returned.
    fn parent(&self) -> Option<Self>
    where
        Self: Sized;

    /// Returns `true` if `self` is a strict ancestor of `child` through
    /// [`parent`](Self::parent) links, so transient children never match.
    fn is_ancestor_of(&self, child: &Self) -> bool
    where
        Self: Sized,
    {
        let target = self.id();
        let mut current = child.parent();
        while let Some(window) = current {
            if window.id() == target {
                return true;
            }
            current = window.parent();
        }
        false
    }
}
