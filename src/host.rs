// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Capabilities the editing core consumes from its host.
//!
//! Every collaborator is injected through a constructor as one of these
//! traits, so the core never reaches for globals and tests can substitute
//! in-memory doubles.

use crate::compile::CompileOptions;
use crate::error::{CompileError, InterpolationError, ProviderError, ShapingError};
use crate::model::{AxisLocation, LayerData, ResolvedLayer};
use crate::shaping::{FeatureSetting, ShapedGlyph, TextDirection};
use std::sync::Arc;

/// Turns one run of text into glyphs.
///
/// `text` is a single bidi run and `direction` overrides any direction the
/// backend would guess. Returned clusters are character offsets into `text`.
pub trait ShapingCapability {
    fn shape(
        &self,
        font_bytes: &[u8],
        text: &str,
        direction: TextDirection,
        features: &[FeatureSetting],
    ) -> Result<Vec<ShapedGlyph>, ShapingError>;
}

/// Unicode bidirectional analysis (UAX #9).
pub trait BidiCapability {
    /// One embedding level per character of `text`
    fn embedding_levels(&self, text: &str) -> Vec<u8>;

    /// Character indices of `text` in visual (left-to-right) order
    fn reordered_indices(&self, text: &str, levels: &[u8]) -> Vec<usize>;
}

/// Glyph storage.
pub trait FontDataProvider {
    /// Fetch a layer with all of its component references resolved
    fn fetch_layer_data(&self, glyph: &str, layer_id: &str) -> Result<ResolvedLayer, ProviderError>;

    /// Store an edited layer. Component resolution keys are ignored.
    fn save_layer_data(&self, glyph: &str, layer_id: &str, data: &LayerData) -> Result<(), ProviderError>;

    /// Design-space location of the master a layer belongs to
    fn master_location(&self, layer_id: &str) -> Option<AxisLocation>;

    /// Layer of the master sitting exactly at `location`, if any
    fn layer_for_location(&self, _location: &AxisLocation) -> Option<String> {
        None
    }
}

/// A shared provider, e.g. one project serving both the editor and an
/// interpolator over the same masters
impl<T: FontDataProvider + ?Sized> FontDataProvider for Arc<T> {
    fn fetch_layer_data(&self, glyph: &str, layer_id: &str) -> Result<ResolvedLayer, ProviderError> {
        (**self).fetch_layer_data(glyph, layer_id)
    }

    fn save_layer_data(&self, glyph: &str, layer_id: &str, data: &LayerData) -> Result<(), ProviderError> {
        (**self).save_layer_data(glyph, layer_id, data)
    }

    fn master_location(&self, layer_id: &str) -> Option<AxisLocation> {
        (**self).master_location(layer_id)
    }

    fn layer_for_location(&self, location: &AxisLocation) -> Option<String> {
        (**self).layer_for_location(location)
    }
}

/// Produces synthetic outlines between masters.
pub trait InterpolationCapability {
    /// Interpolated layer (with `is_interpolated` set) for `glyph` at
    /// `location`. May fail with [`InterpolationError::Cancelled`] when a
    /// newer request superseded this one.
    fn interpolate_glyph(
        &self,
        glyph: &str,
        location: &AxisLocation,
    ) -> Result<ResolvedLayer, InterpolationError>;
}

/// Compiles a serialized font description into binary font bytes.
pub trait CompilationCapability {
    fn compile(&self, font_description: &str, options: &CompileOptions) -> Result<Vec<u8>, CompileError>;
}

/// Receives the text buffer whenever it changes, for the host to persist.
pub trait TextPersistence {
    fn text_changed(&self, text: &str);
}
