// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Shaping vocabulary shared by the text engine and shaping backends.
//!
//! # Architecture
//!
//! - **TextDirection**: direction of one bidi run, derived from the parity
//!   of its embedding level.
//!
//! - **ShapedGlyph**: one glyph as returned by a shaping backend. Its
//!   `cluster` is a character offset; backends return it relative to the
//!   run they were given and the text engine rebases it.
//!
//! - **FeatureSetting**: an OpenType feature toggle parsed from the
//!   `tag=0|1` feature string hosts pass around. [`FeatureInfo`] knows
//!   which features are on when that string does not mention them.
//!
//! The backend itself is a [`crate::host::ShapingCapability`];
//! [`RustybuzzShaper`] is the bundled implementation.

pub mod features;
pub mod rustybuzz_shaper;

pub use features::{DEFAULT_OFF_FEATURES, DEFAULT_ON_FEATURES, FeatureInfo, FeatureSetting, parse_features};
pub use rustybuzz_shaper::RustybuzzShaper;

/// Text direction for a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextDirection {
    /// Left-to-right text (Latin, Cyrillic, etc.)
    #[default]
    LeftToRight,
    /// Right-to-left text (Arabic, Hebrew, etc.)
    RightToLeft,
}

impl TextDirection {
    /// Direction implied by a bidi embedding level (odd = RTL)
    pub fn from_level(level: u8) -> Self {
        if level % 2 == 1 {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }

    /// Returns true if this is RTL direction
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::RightToLeft)
    }
}

/// Result of shaping: one positioned glyph
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph index in the compiled font
    pub glyph_id: u32,
    /// Character offset of the first character this glyph belongs to
    pub cluster: usize,
    pub x_advance: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

impl ShapedGlyph {
    pub fn new(glyph_id: u32, cluster: usize, x_advance: f64) -> Self {
        Self {
            glyph_id,
            cluster,
            x_advance,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_level_parity() {
        assert_eq!(TextDirection::from_level(0), TextDirection::LeftToRight);
        assert_eq!(TextDirection::from_level(1), TextDirection::RightToLeft);
        assert_eq!(TextDirection::from_level(2), TextDirection::LeftToRight);
        assert!(TextDirection::from_level(3).is_rtl());
    }
}
