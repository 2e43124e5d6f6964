// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer interaction and outline mutation

use super::{ComponentOutlineEditor, DragState};
use crate::camera::ViewportCamera;
use crate::editing::hit_test::HitTarget;
use crate::error::EditError;
use crate::model::{LayerData, PointRef, PointType, Shape};
use crate::settings;
use kurbo::{Point, Vec2};
use std::collections::BTreeSet;

impl ComponentOutlineEditor {
    // ===== Pointer =====

    /// Handle a pointer press at `screen`.
    ///
    /// A plain click replaces the selection with the hit item (an item that
    /// is already selected keeps the selection, so several items can be
    /// dragged together), shift toggles the hit item, and a plain click on
    /// empty space clears the selection.
    pub fn pointer_down(&mut self, camera: &ViewportCamera, screen: Point, shift: bool) -> Option<HitTarget> {
        self.drag = DragState {
            pointer_down: true,
            last_local: None,
        };
        if !self.edit_mode {
            return None;
        }

        let hit = self.hit_test(camera, screen);
        match hit {
            Some(target) => {
                let item = target.item();
                if shift {
                    self.selection.toggle(item);
                } else if !self.selection.contains(item) {
                    self.selection.select_only(item);
                }
                if self.selection.contains(item) {
                    self.drag.last_local = Some(self.local_point(camera, screen));
                }
            }
            None if !shift => self.selection.clear(),
            None => {}
        }
        tracing::debug!("Pointer down: hit={:?}, selected={}", hit, self.selection.len());
        hit
    }

    /// Handle pointer motion. Returns true if the outline changed.
    pub fn pointer_move(&mut self, camera: &ViewportCamera, screen: Point) -> bool {
        let Some(last) = self.drag.last_local else {
            return false;
        };
        let local = self.local_point(camera, screen);
        let delta = local - last;
        self.drag.last_local = Some(local);
        if delta == Vec2::ZERO {
            return false;
        }
        self.apply_delta(delta).is_ok()
    }

    /// Handle a pointer release, wherever it happened
    pub fn pointer_up(&mut self) {
        self.drag = DragState::default();
    }

    // ===== Mutation =====

    /// Nudge the selection by the configured step; `dx`/`dy` give the
    /// direction
    pub fn nudge(&mut self, dx: f64, dy: f64, shift: bool, cmd: bool) -> Result<(), EditError> {
        let amount = if cmd {
            settings::nudge::CMD
        } else if shift {
            settings::nudge::SHIFT
        } else {
            settings::nudge::BASE
        };
        self.apply_delta(Vec2::new(dx * amount, dy * amount))
    }

    /// Move every selected item by `delta` (current edit space) and save.
    ///
    /// Off-curve handles next to a moved on-curve point follow it.
    pub fn apply_delta(&mut self, delta: Vec2) -> Result<(), EditError> {
        let Some(layer) = self.layer.as_mut() else {
            return Err(EditError::NoLayer);
        };
        if layer.is_interpolated {
            tracing::warn!("Ignoring edit: interpolated previews are read-only");
            return Err(EditError::Interpolated);
        }
        if self.selection.is_empty() {
            return Ok(());
        }

        let mut moving: BTreeSet<PointRef> = self.selection.points.iter().copied().collect();
        for point in self.selection.points.iter() {
            moving.extend(adjacent_handles(layer, *point));
        }
        for point in moving {
            if let Some(node) = layer.node_mut(point) {
                node.translate(delta);
            }
        }
        for &index in self.selection.anchors.iter() {
            if let Some(anchor) = layer.anchors.get_mut(index) {
                anchor.x += delta.x;
                anchor.y += delta.y;
            }
        }
        for &index in self.selection.components.iter() {
            layer.translate_component(index, delta);
        }

        if self.save_current() {
            self.revision += 1;
        }
        Ok(())
    }

    /// Write the current context's layer through the provider.
    ///
    /// Inside a component the layer belongs to the referenced glyph, so it
    /// is saved under that glyph's name and the arena copy is refreshed.
    /// Returns true if the provider stored the layer.
    fn save_current(&mut self) -> bool {
        let (Some(root), Some(layer)) = (self.root.as_ref(), self.layer.as_ref()) else {
            return false;
        };
        let key = match self.stack.current() {
            Some(frame) => {
                self.arena.update(&frame.key, layer.clone());
                &frame.key
            }
            None => root,
        };

        match self.provider.save_layer_data(&key.glyph, &key.layer, layer) {
            Ok(()) => {
                tracing::debug!("Saved '{}' layer '{}'", key.glyph, key.layer);
                true
            }
            Err(err) => {
                tracing::error!(
                    "Failed to save '{}' layer '{}', keeping edits in memory: {}",
                    key.glyph,
                    key.layer,
                    err
                );
                false
            }
        }
    }
}

/// Off-curve neighbours of `point` when it is an on-curve point
fn adjacent_handles(layer: &LayerData, point: PointRef) -> Vec<PointRef> {
    let Some(Shape::Path { nodes, closed }) = layer.shapes.get(point.shape) else {
        return Vec::new();
    };
    let Some(node) = nodes.get(point.node) else {
        return Vec::new();
    };
    if !node.point_type.is_on_curve() {
        return Vec::new();
    }

    let len = nodes.len();
    let previous = match point.node {
        0 if *closed => Some(len - 1),
        0 => None,
        n => Some(n - 1),
    };
    let next = match point.node + 1 {
        n if n < len => Some(n),
        _ if *closed => Some(0),
        _ => None,
    };

    [previous, next]
        .into_iter()
        .flatten()
        .filter(|&index| index != point.node && nodes[index].point_type == PointType::OffCurve)
        .map(|index| PointRef::new(point.shape, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    #[test]
    fn handles_follow_on_curve_points() {
        let layer = LayerData {
            shapes: vec![Shape::path(vec![
                Node::new(0.0, 0.0, PointType::Curve),
                Node::new(0.0, 50.0, PointType::OffCurve),
                Node::new(50.0, 100.0, PointType::OffCurve),
                Node::new(100.0, 100.0, PointType::Curve),
                Node::new(100.0, 0.0, PointType::Line),
            ])],
            ..LayerData::new(100.0)
        };
        assert_eq!(adjacent_handles(&layer, PointRef::new(0, 3)), vec![PointRef::new(0, 2)]);
        assert_eq!(adjacent_handles(&layer, PointRef::new(0, 0)), vec![PointRef::new(0, 1)]);
        assert!(adjacent_handles(&layer, PointRef::new(0, 1)).is_empty());
        assert!(adjacent_handles(&layer, PointRef::new(0, 4)).is_empty());
    }

    #[test]
    fn open_contour_ends_have_one_neighbour() {
        let layer = LayerData {
            shapes: vec![Shape::Path {
                nodes: vec![
                    Node::new(0.0, 0.0, PointType::Move),
                    Node::new(10.0, 0.0, PointType::OffCurve),
                ],
                closed: false,
            }],
            ..LayerData::new(100.0)
        };
        assert_eq!(adjacent_handles(&layer, PointRef::new(0, 0)), vec![PointRef::new(0, 1)]);
    }
}
