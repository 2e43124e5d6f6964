// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Arena of resolved component layers.
//!
//! Component references are resolved once, when a layer is fetched. Every
//! referenced layer is stored here under its [`LayerKey`] and the component
//! shape only remembers that key. A reference back to any layer on the
//! current resolution path is left unresolved, so the arena never contains
//! a cycle and recursive walks over it always terminate.

use super::layer::{LayerData, LayerKey, Shape};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerArena {
    layers: HashMap<LayerKey, LayerData>,
}

/// A fetched layer together with the layers its components point to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLayer {
    pub layer: LayerData,
    pub arena: LayerArena,
}

impl LayerArena {
    pub fn get(&self, key: &LayerKey) -> Option<&LayerData> {
        self.layers.get(key)
    }

    pub fn contains(&self, key: &LayerKey) -> bool {
        self.layers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayerKey, &LayerData)> {
        self.layers.iter()
    }

    /// Replace the stored layer for `key` (after an edit inside a component)
    pub fn update(&mut self, key: &LayerKey, layer: LayerData) {
        if let Some(slot) = self.layers.get_mut(key) {
            *slot = layer;
        }
    }

    /// Resolve every component reachable from `root`.
    ///
    /// `load` fetches the raw (unresolved) layer for a key. Referenced
    /// glyphs are looked up in the same layer as their parent.
    pub fn resolve<F>(mut root: LayerData, root_key: &LayerKey, mut load: F) -> ResolvedLayer
    where
        F: FnMut(&LayerKey) -> Option<LayerData>,
    {
        let mut arena = LayerArena::default();
        let mut path = vec![root_key.clone()];
        arena.resolve_shapes(&mut root, &mut path, &mut load);
        ResolvedLayer { layer: root, arena }
    }

    fn resolve_shapes<F>(&mut self, layer: &mut LayerData, path: &mut Vec<LayerKey>, load: &mut F)
    where
        F: FnMut(&LayerKey) -> Option<LayerData>,
    {
        let Some(parent) = path.last() else {
            return;
        };
        let layer_id = parent.layer.clone();

        for shape in &mut layer.shapes {
            let Shape::Component {
                reference,
                resolved,
                ..
            } = shape
            else {
                continue;
            };

            let key = LayerKey::new(reference.as_str(), layer_id.as_str());
            if path.contains(&key) {
                tracing::warn!(
                    "Component cycle: '{}' references '{}' which is already being resolved",
                    path.last().map(|k| k.glyph.as_str()).unwrap_or_default(),
                    key.glyph
                );
                *resolved = None;
                continue;
            }

            if self.contains(&key) {
                *resolved = Some(key);
                continue;
            }

            let Some(mut child) = load(&key) else {
                tracing::warn!("Component base '{}' not found in layer '{}'", key.glyph, key.layer);
                *resolved = None;
                continue;
            };

            path.push(key.clone());
            self.resolve_shapes(&mut child, path, load);
            path.pop();

            self.layers.insert(key.clone(), child);
            *resolved = Some(key);
        }
    }
}
