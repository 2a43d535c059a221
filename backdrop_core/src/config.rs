// Copyright 2026 the Backdrop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor configuration.

/// Environment variable read by [`CompositorConfig::from_env`].
///
/// An integer value greater than zero enables downscale mode.
pub const DOWNSCALE_ENV_VAR: &str = "BACKDROP_HIGHDPI_DOWNSCALE";

/// Configuration for a [`SurfaceCompositor`](crate::compositor::SurfaceCompositor).
///
/// The configuration is captured when the compositor is created and never
/// re-read, so changing the environment afterwards has no effect on existing
/// compositors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositorConfig {
    /// Round fractional device-pixel ratios up to the next integer.
    ///
    /// The backing buffer is then rendered at an integer scale and the
    /// platform scales it down on presentation, trading memory for crisper
    /// integer-aligned drawing.
    pub downscale: bool,
}

impl CompositorConfig {
    /// Fractional scaling: the buffer follows the window's ratio exactly.
    #[must_use]
    pub const fn new() -> Self {
        Self { downscale: false }
    }

    /// Downscale mode: the buffer uses the ratio rounded up.
    #[must_use]
    pub const fn downscaled() -> Self {
        Self { downscale: true }
    }

    /// Reads [`DOWNSCALE_ENV_VAR`] from the process environment.
    ///
    /// Missing or unparsable values mean fractional scaling.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(DOWNSCALE_ENV_VAR).ok().as_deref())
    }

    /// Interprets a raw environment value the way [`from_env`](Self::from_env)
    /// does.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        let downscale = value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .is_some_and(|v| v > 0);
        Self { downscale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fractional() {
        assert_eq!(CompositorConfig::default(), CompositorConfig::new());
        assert!(!CompositorConfig::new().downscale);
        assert!(CompositorConfig::downscaled().downscale);
    }

    #[test]
    fn env_value_parsing() {
        assert!(CompositorConfig::from_env_value(Some("1")).downscale);
        assert!(CompositorConfig::from_env_value(Some(" 2 ")).downscale);
        assert!(!CompositorConfig::from_env_value(Some("0")).downscale);
        assert!(!CompositorConfig::from_env_value(Some("-1")).downscale);
        assert!(!CompositorConfig::from_env_value(Some("yes")).downscale);
        assert!(!CompositorConfig::from_env_value(None).downscale);
    }
}
