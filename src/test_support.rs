// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory doubles for the host capabilities, shared by unit tests.

use crate::compile::CompileOptions;
use crate::error::{CompileError, InterpolationError, ProviderError, ShapingError};
use crate::host::{
    BidiCapability, CompilationCapability, FontDataProvider, InterpolationCapability,
    ShapingCapability, TextPersistence,
};
use crate::model::{AxisLocation, LayerArena, LayerData, LayerKey, Node, PointType, ResolvedLayer, Shape};
use crate::shaping::{FeatureSetting, ShapedGlyph, TextDirection};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A closed square contour with its lower-left corner at (x, y)
pub fn square(x: f64, y: f64, size: f64) -> Shape {
    Shape::path(vec![
        Node::new(x, y, PointType::Line),
        Node::new(x + size, y, PointType::Line),
        Node::new(x + size, y + size, PointType::Line),
        Node::new(x, y + size, PointType::Line),
    ])
}

// ============================================================================
// SHAPING
// ============================================================================

/// One glyph per character (glyph id = code point), with optional ligatures.
///
/// Right-to-left runs come back in visual order, the way real shapers
/// report them.
#[derive(Debug, Default)]
pub struct StubShaper {
    pub advances: HashMap<char, f64>,
    /// (sequence, glyph id, advance)
    pub ligatures: Vec<(String, u32, f64)>,
    /// Extra mark glyph emitted after the given character, in its cluster
    pub marks: HashMap<char, (u32, f64)>,
    pub fail: bool,
    pub calls: RefCell<Vec<(String, TextDirection)>>,
}

impl StubShaper {
    pub const DEFAULT_ADVANCE: f64 = 500.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advance(mut self, c: char, advance: f64) -> Self {
        self.advances.insert(c, advance);
        self
    }

    pub fn with_ligature(mut self, sequence: &str, glyph_id: u32, advance: f64) -> Self {
        self.ligatures.push((sequence.to_string(), glyph_id, advance));
        self
    }

    pub fn with_mark(mut self, base: char, glyph_id: u32, advance: f64) -> Self {
        self.marks.insert(base, (glyph_id, advance));
        self
    }
}

impl ShapingCapability for StubShaper {
    fn shape(
        &self,
        _font_bytes: &[u8],
        text: &str,
        direction: TextDirection,
        _features: &[FeatureSetting],
    ) -> Result<Vec<ShapedGlyph>, ShapingError> {
        self.calls.borrow_mut().push((text.to_string(), direction));
        if self.fail {
            return Err(ShapingError::Backend("stub failure".to_string()));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut glyphs = Vec::new();
        let mut i = 0;
        'outer: while i < chars.len() {
            for (sequence, glyph_id, advance) in &self.ligatures {
                let seq: Vec<char> = sequence.chars().collect();
                if chars[i..].starts_with(&seq) {
                    glyphs.push(ShapedGlyph::new(*glyph_id, i, *advance));
                    i += seq.len();
                    continue 'outer;
                }
            }
            let c = chars[i];
            let advance = self.advances.get(&c).copied().unwrap_or(Self::DEFAULT_ADVANCE);
            glyphs.push(ShapedGlyph::new(c as u32, i, advance));
            if let Some((mark_id, mark_advance)) = self.marks.get(&c) {
                glyphs.push(ShapedGlyph::new(*mark_id, i, *mark_advance));
            }
            i += 1;
        }

        if direction.is_rtl() {
            glyphs.reverse();
        }
        Ok(glyphs)
    }
}

/// Hebrew and Arabic blocks are RTL (level 1), everything else level 0
#[derive(Debug, Default)]
pub struct StubBidi {
    /// Return levels for one character fewer than the text has
    pub short_levels: bool,
    /// Return a duplicated index instead of a permutation
    pub broken_permutation: bool,
}

impl StubBidi {
    pub fn is_rtl_char(c: char) -> bool {
        ('\u{0590}'..='\u{08FF}').contains(&c)
    }
}

impl BidiCapability for StubBidi {
    fn embedding_levels(&self, text: &str) -> Vec<u8> {
        let mut levels: Vec<u8> = text.chars().map(|c| u8::from(Self::is_rtl_char(c))).collect();
        if self.short_levels {
            levels.pop();
        }
        levels
    }

    fn reordered_indices(&self, _text: &str, levels: &[u8]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..levels.len()).collect();
        if self.broken_permutation && !order.is_empty() {
            order[0] = order.len() - 1;
            return order;
        }

        // Rule L2: reverse every maximal run at or above each level, from
        // the highest level down to the lowest odd level
        let highest = levels.iter().copied().max().unwrap_or(0);
        let lowest_odd = levels.iter().copied().filter(|l| l % 2 == 1).min().unwrap_or(highest.saturating_add(1));
        let mut level = highest;
        while level >= lowest_odd && level > 0 {
            let mut i = 0;
            while i < order.len() {
                if levels[order[i]] >= level {
                    let start = i;
                    while i < order.len() && levels[order[i]] >= level {
                        i += 1;
                    }
                    order[start..i].reverse();
                } else {
                    i += 1;
                }
            }
            level -= 1;
        }
        order
    }
}

/// Records every text change
#[derive(Debug, Default)]
pub struct RecordingPersistence {
    pub texts: RefCell<Vec<String>>,
}

impl TextPersistence for RecordingPersistence {
    fn text_changed(&self, text: &str) {
        self.texts.borrow_mut().push(text.to_string());
    }
}

// ============================================================================
// FONT DATA
// ============================================================================

/// Glyph storage backed by a map, with a save log
#[derive(Debug, Default)]
pub struct MemoryProvider {
    pub layers: RefCell<HashMap<LayerKey, LayerData>>,
    pub locations: HashMap<String, AxisLocation>,
    pub saves: RefCell<Vec<(String, String, LayerData)>>,
    pub fail_saves: Cell<bool>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(self, glyph: &str, layer_id: &str, data: LayerData) -> Self {
        self.layers.borrow_mut().insert(LayerKey::new(glyph, layer_id), data);
        self
    }

    pub fn with_location(mut self, layer_id: &str, location: AxisLocation) -> Self {
        self.locations.insert(layer_id.to_string(), location);
        self
    }

    pub fn stored(&self, glyph: &str, layer_id: &str) -> Option<LayerData> {
        self.layers.borrow().get(&LayerKey::new(glyph, layer_id)).cloned()
    }
}

impl FontDataProvider for MemoryProvider {
    fn fetch_layer_data(&self, glyph: &str, layer_id: &str) -> Result<ResolvedLayer, ProviderError> {
        let layers = self.layers.borrow();
        let key = LayerKey::new(glyph, layer_id);
        let root = layers
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::GlyphNotFound(glyph.to_string()))?;
        Ok(LayerArena::resolve(root, &key, |k| layers.get(k).cloned()))
    }

    fn save_layer_data(&self, glyph: &str, layer_id: &str, data: &LayerData) -> Result<(), ProviderError> {
        self.saves
            .borrow_mut()
            .push((glyph.to_string(), layer_id.to_string(), data.clone()));
        if self.fail_saves.get() {
            return Err(ProviderError::Storage("disk full".to_string()));
        }
        self.layers
            .borrow_mut()
            .insert(LayerKey::new(glyph, layer_id), data.clone());
        Ok(())
    }

    fn master_location(&self, layer_id: &str) -> Option<AxisLocation> {
        self.locations.get(layer_id).cloned()
    }

    fn layer_for_location(&self, location: &AxisLocation) -> Option<String> {
        let mut layers: Vec<_> = self.locations.iter().filter(|(_, l)| l.matches(location)).collect();
        layers.sort_by(|a, b| a.0.cmp(b.0));
        layers.first().map(|(id, _)| id.to_string())
    }
}

/// Returns a fixed outline (width = requested weight) or a fixed error
#[derive(Debug, Default)]
pub struct StubInterpolator {
    pub cancel: Cell<bool>,
    pub fail: Cell<bool>,
    pub requests: RefCell<Vec<(String, AxisLocation)>>,
}

impl InterpolationCapability for StubInterpolator {
    fn interpolate_glyph(
        &self,
        glyph: &str,
        location: &AxisLocation,
    ) -> Result<ResolvedLayer, InterpolationError> {
        self.requests
            .borrow_mut()
            .push((glyph.to_string(), location.clone()));
        if self.cancel.get() {
            return Err(InterpolationError::Cancelled);
        }
        if self.fail.get() {
            return Err(InterpolationError::NoMasters);
        }
        let layer = LayerData {
            shapes: vec![square(0.0, 0.0, 100.0)],
            width: location.get("Weight").unwrap_or_default(),
            is_interpolated: true,
            ..LayerData::default()
        };
        Ok(ResolvedLayer {
            layer,
            arena: LayerArena::default(),
        })
    }
}

// ============================================================================
// COMPILATION
// ============================================================================

/// Returns the description bytes, or fails on demand
#[derive(Debug, Default)]
pub struct StubCompiler {
    pub fail: Cell<bool>,
    pub calls: Cell<usize>,
}

impl CompilationCapability for StubCompiler {
    fn compile(&self, font_description: &str, _options: &CompileOptions) -> Result<Vec<u8>, CompileError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail.get() {
            return Err(CompileError::Failed("stub failure".to_string()));
        }
        Ok(font_description.as_bytes().to_vec())
    }
}
