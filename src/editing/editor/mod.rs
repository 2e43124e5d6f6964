// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Component outline editor - owns the outline of the active glyph layer

mod layers;
mod mutation;

pub use layers::{EscapeOutcome, InterpolationTicket};

use super::hit_test::{self, HitTarget};
use super::selection::OutlineSelection;
use super::stack::{ComponentFrame, ComponentStack};
use crate::camera::{Scheduler, ViewportCamera};
use crate::host::{FontDataProvider, InterpolationCapability};
use crate::model::{AxisLocation, LayerArena, LayerData, LayerKey, Shape};
use crate::settings::Settings;
use kurbo::{Affine, Point};
use std::rc::Rc;

/// Pointer interaction flags
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DragState {
    pointer_down: bool,
    /// Last pointer position in the current edit space, while dragging
    last_local: Option<Point>,
}

/// Layer and axis state saved when a slider drag begins
#[derive(Debug, Clone, PartialEq)]
struct SliderSession {
    layer_id: Option<String>,
    location: AxisLocation,
}

/// Interactive editor for one glyph layer and its nested components.
///
/// The editor edits exactly one context at a time: the root layer, or the
/// layer of the component most recently entered. Every mutation is saved
/// through the provider right away.
pub struct ComponentOutlineEditor {
    provider: Rc<dyn FontDataProvider>,
    interpolator: Option<Rc<dyn InterpolationCapability>>,
    /// Hit radius at scale 1.0, in font units
    hit_radius: f64,

    /// Root glyph and layer id being edited
    root: Option<LayerKey>,
    location: AxisLocation,
    /// Layer of the current editing context
    layer: Option<LayerData>,
    arena: LayerArena,
    stack: ComponentStack,
    selection: OutlineSelection,
    drag: DragState,
    edit_mode: bool,

    /// Incremented after every applied mutation
    revision: u64,
    /// Horizontal position of the glyph within the text line (font units)
    glyph_offset: f64,

    next_ticket: u64,
    pending_interpolation: Option<InterpolationTicket>,
    slider: Option<SliderSession>,
    axis_tweens: Scheduler<String, f64>,
}

impl ComponentOutlineEditor {
    pub fn new(
        provider: Rc<dyn FontDataProvider>,
        interpolator: Option<Rc<dyn InterpolationCapability>>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            interpolator,
            hit_radius: settings.hit_radius,
            root: None,
            location: AxisLocation::new(),
            layer: None,
            arena: LayerArena::default(),
            stack: ComponentStack::new(),
            selection: OutlineSelection::default(),
            drag: DragState::default(),
            edit_mode: false,
            revision: 0,
            glyph_offset: 0.0,
            next_ticket: 0,
            pending_interpolation: None,
            slider: None,
            axis_tweens: Scheduler::new(),
        }
    }

    // ===== State for rendering =====

    /// Layer of the current editing context
    pub fn layer(&self) -> Option<&LayerData> {
        self.layer.as_ref()
    }

    /// Resolved component layers reachable from the root layer
    pub fn arena(&self) -> &LayerArena {
        &self.arena
    }

    pub fn selection(&self) -> &OutlineSelection {
        &self.selection
    }

    pub fn component_stack(&self) -> &ComponentStack {
        &self.stack
    }

    /// Root glyph name
    pub fn glyph_name(&self) -> Option<&str> {
        self.root.as_ref().map(|key| key.glyph.as_str())
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.root.as_ref().map(|key| key.layer.as_str())
    }

    /// Glyph whose outline is being edited: the innermost component's
    /// reference, or the root glyph
    pub fn current_glyph(&self) -> Option<&str> {
        match self.stack.current() {
            Some(frame) => Some(frame.key.glyph.as_str()),
            None => self.glyph_name(),
        }
    }

    /// Shape index of the component being edited, if inside one
    pub fn editing_component(&self) -> Option<usize> {
        self.stack.current().map(|frame| frame.component_index)
    }

    pub fn location(&self) -> &AxisLocation {
        &self.location
    }

    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    pub fn is_interpolated(&self) -> bool {
        self.layer.as_ref().is_some_and(|layer| layer.is_interpolated)
    }

    pub fn is_pointer_down(&self) -> bool {
        self.drag.pointer_down
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.last_local.is_some()
    }

    /// Number of mutations saved through the provider so far
    pub fn edit_revision(&self) -> u64 {
        self.revision
    }

    pub fn glyph_offset(&self) -> f64 {
        self.glyph_offset
    }

    /// Place the glyph at `offset` along the text line
    pub fn set_glyph_offset(&mut self, offset: f64) {
        self.glyph_offset = offset;
    }

    /// Current edit space -> root glyph space
    pub fn accumulated_transform(&self) -> Affine {
        self.stack.accumulated_transform()
    }

    /// Current edit space -> design space of the text line
    pub fn placement_transform(&self) -> Affine {
        Affine::translate((self.glyph_offset, 0.0)) * self.accumulated_transform()
    }

    // ===== Coordinate spaces =====

    /// Map a screen position into the current edit space
    pub fn local_point(&self, camera: &ViewportCamera, screen: Point) -> Point {
        let design = camera.to_design(screen);
        let root = Point::new(design.x - self.glyph_offset, design.y);
        hit_test::to_local(self.accumulated_transform(), root)
    }

    /// What lies under a screen position, for hover feedback
    pub fn hit_test(&self, camera: &ViewportCamera, screen: Point) -> Option<HitTarget> {
        let layer = self.layer.as_ref()?;
        let local = self.local_point(camera, screen);
        let radius = self.hit_radius / camera.scale();
        hit_test::hit_test(layer, &self.arena, local, radius)
    }

    // ===== Component stack =====

    /// Descend into the component at `index`.
    ///
    /// Only resolved components can be entered. Anything else is logged and
    /// ignored.
    pub fn enter_component_editing(&mut self, index: usize) -> bool {
        let Some(layer) = self.layer.as_ref() else {
            tracing::debug!("No layer loaded, cannot enter component {}", index);
            return false;
        };
        let Some(Shape::Component {
            reference,
            transform,
            resolved,
        }) = layer.shapes.get(index)
        else {
            tracing::debug!("Shape {} is not a component", index);
            return false;
        };
        let Some(key) = resolved else {
            tracing::warn!("Component '{}' is unresolved, cannot edit it", reference);
            return false;
        };
        let Some(child) = self.arena.get(key).cloned() else {
            tracing::warn!("Component '{}' has no resolved layer", reference);
            return false;
        };

        let frame = ComponentFrame {
            component_index: index,
            component_transform: *transform,
            entry_transform: self.accumulated_transform(),
            key: key.clone(),
            parent_layer: layer.clone(),
            parent_selection: std::mem::take(&mut self.selection),
            parent_glyph: self.current_glyph().unwrap_or_default().to_string(),
        };
        tracing::info!(
            "Editing component '{}' (depth {})",
            frame.key.glyph,
            self.stack.depth() + 1
        );

        let mut child = child;
        child.is_interpolated = layer.is_interpolated;
        self.stack.push(frame);
        self.layer = Some(child);
        self.drag = DragState::default();
        true
    }

    /// Return to the parent context. False when already at the root.
    pub fn exit_component_editing(&mut self) -> bool {
        let Some(frame) = self.stack.pop() else {
            return false;
        };
        tracing::info!("Left component '{}'", frame.key.glyph);
        self.layer = Some(frame.parent_layer);
        self.selection = frame.parent_selection;
        self.drag = DragState::default();
        true
    }
}

impl std::fmt::Debug for ComponentOutlineEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentOutlineEditor")
            .field("root", &self.root)
            .field("location", &self.location)
            .field("depth", &self.stack.depth())
            .field("edit_mode", &self.edit_mode)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
