// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-safe reference counting on top of [`AtomicCell`].

use crate::atomic::{AtomicCell, AtomicCounter as _};
use crate::util::debug_panic;

/// A reference count built from relaxed [`AtomicCounter`](crate::atomic::AtomicCounter)
/// operations.
///
/// The count starts at zero. [`acquire`](Self::acquire) registers an owner
/// and [`release`](Self::release) drops one, returning `false` when the last
/// owner is gone. Acquiring from zero (resurrecting a released object) and
/// releasing below zero are caller bugs: they panic in debug builds and are
/// logged in release builds.
///
/// Only the count itself is atomic. Callers that free memory when the count
/// reaches zero must add their own acquire fence before doing so.
#[derive(Debug, Default)]
pub struct RefCount {
    count: AtomicCell<i32>,
}

impl RefCount {
    /// Creates a count with no owners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicCell::<i32>::new(0),
        }
    }

    /// Creates a count with one owner.
    #[must_use]
    pub const fn one() -> Self {
        Self {
            count: AtomicCell::<i32>::new(1),
        }
    }

    /// Registers an owner.
    pub fn acquire(&self) {
        if !self.count.increment() {
            debug_panic!("RefCount overflowed to zero");
        }
    }

    /// Registers an owner of a count that is already owned.
    ///
    /// Reports acquiring from zero, which resurrects a released count.
    pub fn acquire_shared(&self) {
        let previous = self.count.load();
        if previous <= 0 {
            debug_panic!("RefCount acquired from {previous}; the object was already released");
        }
        self.acquire();
    }

    /// Drops an owner. Returns `false` if this was the last one.
    pub fn release(&self) -> bool {
        let alive = self.count.decrement();
        if alive && self.count.load() < 0 {
            debug_panic!("RefCount released more times than acquired");
        }
        alive
    }

    /// Returns the current number of owners.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count.load()
    }

    /// Returns `true` if there is at least one owner.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.count.load() > 0
    }

    /// Returns `true` if more than one owner exists.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.count.load() > 1
    }
}
