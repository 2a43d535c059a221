// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Miscellaneous internal helpers.

/// Panics in debug builds, logs an error in release builds.
///
/// Used for internal consistency violations that indicate a bug but that the
/// compositor can recover from by clamping.
macro_rules! debug_panic {
    ($msg:expr$(,)?) => {
        if cfg!(debug_assertions) {
            panic!($msg);
        } else {
            tracing::error!($msg);
        }
    };
    ($fmt:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) {
            panic!($fmt, $($arg)*);
        } else {
            tracing::error!($fmt, $($arg)*);
        }
    };
}

pub(crate) use debug_panic;

/// Rounds half-way cases to the nearest even integer.
///
/// This is the single rounding rule used for every logical-to-native
/// conversion, so that a point and a rect scaled separately agree whenever
/// their inputs agree.
#[inline]
#[must_use]
pub(crate) fn round_ties_even(v: f64) -> f64 {
    libm::rint(v)
}

/// Rounds `v` and converts to `i32`, saturating at the type bounds.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate; coordinates are far below i32 bounds"
)]
pub(crate) fn round_to_i32(v: f64) -> i32 {
    round_ties_even(v) as i32
}
