// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lock-free read-modify-write primitives on single machine words.
//!
//! [`AtomicCell<T>`] wraps one integer cell of width 1, 2, 4 or 8 bytes and
//! [`AtomicPtrCell<T>`] wraps one pointer cell. Both implement [`AtomicOps`]
//! (compare-and-swap, swap, add); integer cells additionally implement
//! [`AtomicCounter`] (increment/decrement with a zero test), which is what
//! reference counts are built from.
//!
//! # Memory ordering
//!
//! Every operation in [`AtomicOps`] and [`AtomicCounter`] is
//! [`Relaxed`](Ordering::Relaxed): the single word is updated atomically, but
//! no ordering is imposed on surrounding reads and writes. Publishing a
//! fully-constructed object through a cell, or double-checked initialization,
//! needs a [`fence`](core::sync::atomic::fence) or the explicit
//! [`load_acquire`](AtomicCell::load_acquire) /
//! [`store_release`](AtomicCell::store_release) /
//! [`test_and_set_acquire`](AtomicCell::test_and_set_acquire) /
//! [`test_and_set_release`](AtomicCell::test_and_set_release) variants.
//! The relaxed defaults are intentional and are not strengthened behind the
//! caller's back.
//!
//! # Progress
//!
//! Integer operations map to a single hardware read-modify-write and are
//! wait-free. Pointer [`fetch_and_add`](AtomicOps::fetch_and_add) is a
//! compare-and-swap loop (lock-free) so that the result keeps the provenance
//! of the original pointer. Retry loops on top of
//! [`test_and_set`](AtomicOps::test_and_set) are the caller's
//! responsibility.

use core::fmt;
use core::sync::atomic::{
    AtomicI8, AtomicI16, AtomicI32, AtomicIsize, AtomicPtr, AtomicU8, AtomicU16, AtomicU32,
    AtomicUsize, Ordering,
};
#[cfg(target_has_atomic = "64")]
use core::sync::atomic::{AtomicI64, AtomicU64};

const RELAXED: Ordering = Ordering::Relaxed;

/// Read-modify-write operations shared by integer and pointer cells.
///
/// All operations are relaxed; see the [module docs](self).
pub trait AtomicOps {
    /// The value stored in the cell.
    type Value: Copy;
    /// The operand of [`fetch_and_add`](Self::fetch_and_add).
    type Delta: Copy;

    /// Stores `new` iff the current value equals `expected`.
    ///
    /// The comparison is bitwise at the cell's native width. Returns whether
    /// the swap happened.
    fn test_and_set(&self, expected: Self::Value, new: Self::Value) -> bool;

    /// Replaces the value and returns the previous one.
    fn fetch_and_store(&self, new: Self::Value) -> Self::Value;

    /// Adds `delta` and returns the value before the addition.
    ///
    /// Integer cells wrap on overflow. Pointer cells advance by `delta`
    /// elements of the pointee type.
    fn fetch_and_add(&self, delta: Self::Delta) -> Self::Value;
}

/// Reference-count style increment and decrement on integer cells.
pub trait AtomicCounter: AtomicOps {
    /// Adds one; returns `true` iff the new value is non-zero.
    ///
    /// Incrementing a count that already reached zero is meaningless for
    /// reference counting. Detecting it is the caller's job; this primitive
    /// only reports the new value's zero-ness.
    fn increment(&self) -> bool;

    /// Subtracts one; returns `true` iff the new value is non-zero.
    ///
    /// `false` means the last reference was released.
    fn decrement(&self) -> bool;
}

/// An integer type with a native atomic counterpart.
///
/// Implemented for the primitive integers whose width the target supports
/// atomically. The associated functions are plumbing for [`AtomicCell`] and
/// are not meant to be called directly.
pub trait Word: Copy + Eq + fmt::Debug {
    /// The `core::sync::atomic` type holding this integer.
    type Atomic: Send + Sync;

    /// Zero.
    const ZERO: Self;
    /// One.
    const ONE: Self;

    /// Wraps `v` in a fresh atomic.
    fn new_atomic(v: Self) -> Self::Atomic;
    /// Atomic load.
    fn load(a: &Self::Atomic, order: Ordering) -> Self;
    /// Atomic store.
    fn store(a: &Self::Atomic, v: Self, order: Ordering);
    /// Atomic swap.
    fn swap(a: &Self::Atomic, v: Self, order: Ordering) -> Self;
    /// Atomic strong compare-exchange.
    fn compare_exchange(
        a: &Self::Atomic,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
    /// Atomic wrapping add.
    fn fetch_add(a: &Self::Atomic, v: Self, order: Ordering) -> Self;
    /// Atomic wrapping subtract.
    fn fetch_sub(a: &Self::Atomic, v: Self, order: Ordering) -> Self;
    /// Non-atomic wrapping add.
    fn wrapping_add(self, v: Self) -> Self;
    /// Non-atomic wrapping subtract.
    fn wrapping_sub(self, v: Self) -> Self;
}

/// One integer cell subject to concurrent read-modify-write.
///
/// The cell has no ownership semantics; it is raw shared memory. Callers
/// build reference counting or publication protocols on top.
pub struct AtomicCell<T: Word> {
    inner: T::Atomic,
}

impl<T: Word> AtomicCell<T> {
    /// Relaxed load.
    #[inline]
    #[must_use]
    pub fn load(&self) -> T {
        T::load(&self.inner, RELAXED)
    }

    /// Relaxed store.
    #[inline]
    pub fn store(&self, v: T) {
        T::store(&self.inner, v, RELAXED);
    }

    /// Acquire load; pairs with [`store_release`](Self::store_release).
    #[inline]
    #[must_use]
    pub fn load_acquire(&self) -> T {
        T::load(&self.inner, Ordering::Acquire)
    }

    /// Release store; pairs with [`load_acquire`](Self::load_acquire).
    #[inline]
    pub fn store_release(&self, v: T) {
        T::store(&self.inner, v, Ordering::Release);
    }

    /// Compare-and-swap with acquire ordering on success.
    #[inline]
    pub fn test_and_set_acquire(&self, expected: T, new: T) -> bool {
        T::compare_exchange(&self.inner, expected, new, Ordering::Acquire, RELAXED).is_ok()
    }

    /// Compare-and-swap with release ordering on success.
    #[inline]
    pub fn test_and_set_release(&self, expected: T, new: T) -> bool {
        T::compare_exchange(&self.inner, expected, new, Ordering::Release, RELAXED).is_ok()
    }
}

impl<T: Word> AtomicOps for AtomicCell<T> {
    type Value = T;
    type Delta = T;

    #[inline]
    fn test_and_set(&self, expected: T, new: T) -> bool {
        T::compare_exchange(&self.inner, expected, new, RELAXED, RELAXED).is_ok()
    }

    #[inline]
    fn fetch_and_store(&self, new: T) -> T {
        T::swap(&self.inner, new, RELAXED)
    }

    #[inline]
    fn fetch_and_add(&self, delta: T) -> T {
        T::fetch_add(&self.inner, delta, RELAXED)
    }
}

impl<T: Word> AtomicCounter for AtomicCell<T> {
    #[inline]
    fn increment(&self) -> bool {
        T::fetch_add(&self.inner, T::ONE, RELAXED).wrapping_add(T::ONE) != T::ZERO
    }

    #[inline]
    fn decrement(&self) -> bool {
        T::fetch_sub(&self.inner, T::ONE, RELAXED).wrapping_sub(T::ONE) != T::ZERO
    }
}

impl<T: Word> From<T> for AtomicCell<T> {
    fn from(v: T) -> Self {
        Self {
            inner: T::new_atomic(v),
        }
    }
}

impl<T: Word> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::from(T::ZERO)
    }
}

impl<T: Word> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCell").field(&self.load()).finish()
    }
}

macro_rules! impl_word {
    ($($(#[$attr:meta])* $int:ty => $atomic:ty),* $(,)?) => {$(
        $(#[$attr])*
        impl Word for $int {
            type Atomic = $atomic;

            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn new_atomic(v: Self) -> Self::Atomic {
                <$atomic>::new(v)
            }

            #[inline]
            fn load(a: &Self::Atomic, order: Ordering) -> Self {
                a.load(order)
            }

            #[inline]
            fn store(a: &Self::Atomic, v: Self, order: Ordering) {
                a.store(v, order);
            }

            #[inline]
            fn swap(a: &Self::Atomic, v: Self, order: Ordering) -> Self {
                a.swap(v, order)
            }

            #[inline]
            fn compare_exchange(
                a: &Self::Atomic,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                a.compare_exchange(current, new, success, failure)
            }

            #[inline]
            fn fetch_add(a: &Self::Atomic, v: Self, order: Ordering) -> Self {
                a.fetch_add(v, order)
            }

            #[inline]
            fn fetch_sub(a: &Self::Atomic, v: Self, order: Ordering) -> Self {
                a.fetch_sub(v, order)
            }

            #[inline]
            fn wrapping_add(self, v: Self) -> Self {
                <$int>::wrapping_add(self, v)
            }

            #[inline]
            fn wrapping_sub(self, v: Self) -> Self {
                <$int>::wrapping_sub(self, v)
            }
        }

        $(#[$attr])*
        impl AtomicCell<$int> {
            /// Creates a cell holding `v`.
            #[inline]
            #[must_use]
            pub const fn new(v: $int) -> Self {
                Self {
                    inner: <$atomic>::new(v),
                }
            }
        }
    )*};
}

impl_word! {
    i8 => AtomicI8,
    u8 => AtomicU8,
    i16 => AtomicI16,
    u16 => AtomicU16,
    i32 => AtomicI32,
    u32 => AtomicU32,
    #[cfg(target_has_atomic = "64")]
    i64 => AtomicI64,
    #[cfg(target_has_atomic = "64")]
    u64 => AtomicU64,
    isize => AtomicIsize,
    usize => AtomicUsize,
}

/// One pointer cell subject to concurrent read-modify-write.
pub struct AtomicPtrCell<T> {
    inner: AtomicPtr<T>,
}

impl<T> AtomicPtrCell<T> {
    /// Creates a cell holding `ptr`.
    #[inline]
    #[must_use]
    pub const fn new(ptr: *mut T) -> Self {
        Self {
            inner: AtomicPtr::new(ptr),
        }
    }

    /// Creates a cell holding the null pointer.
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::new(core::ptr::null_mut())
    }

    /// Relaxed load.
    #[inline]
    #[must_use]
    pub fn load(&self) -> *mut T {
        self.inner.load(RELAXED)
    }

    /// Relaxed store.
    #[inline]
    pub fn store(&self, ptr: *mut T) {
        self.inner.store(ptr, RELAXED);
    }

    /// Acquire load; pairs with [`store_release`](Self::store_release).
    #[inline]
    #[must_use]
    pub fn load_acquire(&self) -> *mut T {
        self.inner.load(Ordering::Acquire)
    }

    /// Release store; pairs with [`load_acquire`](Self::load_acquire).
    #[inline]
    pub fn store_release(&self, ptr: *mut T) {
        self.inner.store(ptr, Ordering::Release);
    }
}

impl<T> AtomicOps for AtomicPtrCell<T> {
    type Value = *mut T;
    type Delta = isize;

    #[inline]
    fn test_and_set(&self, expected: *mut T, new: *mut T) -> bool {
        self.inner
            .compare_exchange(expected, new, RELAXED, RELAXED)
            .is_ok()
    }

    #[inline]
    fn fetch_and_store(&self, new: *mut T) -> *mut T {
        self.inner.swap(new, RELAXED)
    }

    #[inline]
    fn fetch_and_add(&self, delta: isize) -> *mut T {
        // The closure never declines, so both arms carry the previous value.
        match self
            .inner
            .fetch_update(RELAXED, RELAXED, |p| Some(p.wrapping_offset(delta)))
        {
            Ok(prev) | Err(prev) => prev,
        }
    }
}

impl<T> Default for AtomicPtrCell<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for AtomicPtrCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicPtrCell({:p})", self.load())
    }
}
