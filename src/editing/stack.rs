// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Nested component editing contexts.
//!
//! Descending into a component pushes a frame remembering where we came
//! from. The accumulated transform is the product of every frame's
//! component transform, root first, and maps the innermost edit space to
//! root glyph space.

use super::selection::OutlineSelection;
use crate::model::{LayerData, LayerKey};
use kurbo::Affine;

/// What is needed to return to the parent context
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFrame {
    /// Index of the component shape in the parent layer
    pub component_index: usize,
    /// The component's own placement transform
    pub component_transform: Affine,
    /// Accumulated transform of the parent context at entry
    pub entry_transform: Affine,
    /// Arena entry of the layer being edited in this frame
    pub key: LayerKey,
    pub parent_layer: LayerData,
    pub parent_selection: OutlineSelection,
    pub parent_glyph: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentStack {
    frames: Vec<ComponentFrame>,
}

impl ComponentStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[ComponentFrame] {
        &self.frames
    }

    pub fn current(&self) -> Option<&ComponentFrame> {
        self.frames.last()
    }

    pub fn push(&mut self, frame: ComponentFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ComponentFrame> {
        self.frames.pop()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Innermost edit space -> root glyph space
    pub fn accumulated_transform(&self) -> Affine {
        self.frames
            .iter()
            .fold(Affine::IDENTITY, |acc, frame| acc * frame.component_transform)
    }
}
