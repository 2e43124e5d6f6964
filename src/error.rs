// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared across the editing core.
//!
//! None of these ever reach render state: callers log them and keep the
//! last good display.

use thiserror::Error;

/// Failures reported by a font-data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("glyph '{0}' not found")]
    GlyphNotFound(String),

    #[error("layer '{layer}' not found for glyph '{glyph}'")]
    LayerNotFound { glyph: String, layer: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Failures reported by an interpolation capability
#[derive(Debug, Error)]
pub enum InterpolationError {
    /// A newer request for the same glyph replaced this one
    #[error("interpolation request was superseded")]
    Cancelled,

    #[error("no masters available for interpolation")]
    NoMasters,

    #[error("glyph '{glyph}' is not interpolatable: {reason}")]
    Incompatible { glyph: String, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl InterpolationError {
    /// Whether this is the distinguished cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures while shaping a run of text
#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("no font bytes loaded")]
    NoFont,

    #[error("font data could not be parsed")]
    InvalidFont,

    #[error("bidi levels cover {got} characters, text has {expected}")]
    LevelMismatch { expected: usize, got: usize },

    #[error("visual order is not a permutation of the text indices")]
    InvalidPermutation,

    #[error("shaper returned cluster {cluster} outside run of length {len}")]
    ClusterOutOfRange { cluster: usize, len: usize },

    #[error("shaping backend failed: {0}")]
    Backend(String),
}

/// Failures reported by a compilation capability
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("font description could not be produced: {0}")]
    Description(String),

    #[error("compilation failed: {0}")]
    Failed(String),
}

/// Rejected outline mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no layer is loaded")]
    NoLayer,

    #[error("interpolated previews are read-only")]
    Interpolated,
}

/// Failures while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}
