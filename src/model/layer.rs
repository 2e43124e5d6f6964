// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Outline data for one glyph layer.
//!
//! A layer is an ordered list of shapes. Each shape is either a path (a UFO
//! style point list) or a component that places another glyph through an
//! affine transform. Component layers are never embedded: a resolved
//! component only carries the [`LayerKey`] of its entry in a
//! [`LayerArena`](super::LayerArena).

use super::arena::LayerArena;
use crate::settings;
use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

/// Point type classification (UFO semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointType {
    Move,
    Line,
    OffCurve,
    Curve,
    QCurve,
}

impl PointType {
    pub fn is_on_curve(self) -> bool {
        !matches!(self, Self::OffCurve)
    }
}

/// A point in a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub point_type: PointType,
    #[serde(default)]
    pub smooth: bool,
}

impl Node {
    pub fn new(x: f64, y: f64, point_type: PointType) -> Self {
        Self {
            x,
            y,
            point_type,
            smooth: false,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

/// A named attachment position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Identifies one glyph layer: the arena key for resolved components
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerKey {
    pub glyph: String,
    pub layer: String,
}

impl LayerKey {
    pub fn new(glyph: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            layer: layer.into(),
        }
    }
}

/// Address of a node: index of its path shape, then index in that path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointRef {
    pub shape: usize,
    pub node: usize,
}

impl PointRef {
    pub fn new(shape: usize, node: usize) -> Self {
        Self { shape, node }
    }
}

/// One entry of a layer's shape list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Shape {
    Path {
        nodes: Vec<Node>,
        closed: bool,
    },
    Component {
        /// Name of the referenced glyph
        reference: String,
        transform: Affine,
        /// Arena entry holding the referenced layer, once resolved
        #[serde(default, skip_serializing)]
        resolved: Option<LayerKey>,
    },
}

impl Shape {
    /// A closed path shape
    pub fn path(nodes: Vec<Node>) -> Self {
        Self::Path {
            nodes,
            closed: true,
        }
    }

    /// An unresolved component
    pub fn component(reference: impl Into<String>, transform: Affine) -> Self {
        Self::Component {
            reference: reference.into(),
            transform,
            resolved: None,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component { .. })
    }
}

/// The glyph outline under edit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerData {
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    pub width: f64,
    /// Synthetic data produced by interpolation; never editable
    #[serde(default)]
    pub is_interpolated: bool,
}

impl LayerData {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn node(&self, point: PointRef) -> Option<&Node> {
        match self.shapes.get(point.shape)? {
            Shape::Path { nodes, .. } => nodes.get(point.node),
            Shape::Component { .. } => None,
        }
    }

    pub fn node_mut(&mut self, point: PointRef) -> Option<&mut Node> {
        match self.shapes.get_mut(point.shape)? {
            Shape::Path { nodes, .. } => nodes.get_mut(point.node),
            Shape::Component { .. } => None,
        }
    }

    /// All nodes with their addresses, in shape order
    pub fn points(&self) -> impl Iterator<Item = (PointRef, &Node)> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .filter_map(|(shape_index, shape)| match shape {
                Shape::Path { nodes, .. } => Some((shape_index, nodes)),
                Shape::Component { .. } => None,
            })
            .flat_map(|(shape_index, nodes)| {
                nodes
                    .iter()
                    .enumerate()
                    .map(move |(node_index, node)| (PointRef::new(shape_index, node_index), node))
            })
    }

    /// Transform of the component at `index`, if that shape is a component
    pub fn component_transform(&self, index: usize) -> Option<Affine> {
        match self.shapes.get(index)? {
            Shape::Component { transform, .. } => Some(*transform),
            Shape::Path { .. } => None,
        }
    }

    /// Translate the component at `index` in this layer's space
    pub fn translate_component(&mut self, index: usize, delta: Vec2) -> bool {
        match self.shapes.get_mut(index) {
            Some(Shape::Component { transform, .. }) => {
                *transform = Affine::translate(delta) * *transform;
                true
            }
            _ => false,
        }
    }

    /// Full outline, following resolved components through the arena
    pub fn outline(&self, arena: &LayerArena) -> BezPath {
        let mut path = BezPath::new();
        self.append_outline(arena, Affine::IDENTITY, 0, &mut path);
        path
    }

    /// Outline of the component at `index`, in this layer's space
    pub fn component_outline(&self, index: usize, arena: &LayerArena) -> Option<BezPath> {
        let Shape::Component {
            transform,
            resolved: Some(key),
            ..
        } = self.shapes.get(index)?
        else {
            return None;
        };
        let child = arena.get(key)?;
        let mut path = BezPath::new();
        child.append_outline(arena, *transform, 1, &mut path);
        Some(path)
    }

    fn append_outline(&self, arena: &LayerArena, transform: Affine, depth: usize, out: &mut BezPath) {
        for shape in &self.shapes {
            match shape {
                Shape::Path { nodes, closed } => {
                    let mut local = BezPath::new();
                    append_contour(nodes, *closed, &mut local);
                    let placed = transform * local;
                    out.extend(placed.elements().iter().copied());
                }
                Shape::Component {
                    transform: component_transform,
                    resolved: Some(key),
                    reference,
                } => {
                    if depth >= settings::hit::MAX_COMPONENT_DEPTH {
                        tracing::warn!("Component '{}' nested too deeply, skipping", reference);
                        continue;
                    }
                    if let Some(child) = arena.get(key) {
                        child.append_outline(arena, transform * *component_transform, depth + 1, out);
                    }
                }
                Shape::Component { .. } => {}
            }
        }
    }

    /// Bounding box of the full outline, or `None` for an empty glyph
    pub fn bounds(&self, arena: &LayerArena) -> Option<Rect> {
        let outline = self.outline(arena);
        if outline.elements().is_empty() {
            return None;
        }
        Some(outline.bounding_box())
    }
}

/// Append one UFO point list to `path` as Bézier segments
pub fn append_contour(nodes: &[Node], closed: bool, path: &mut BezPath) {
    if nodes.is_empty() {
        return;
    }

    let start = if closed {
        nodes.iter().position(|n| n.point_type.is_on_curve())
    } else {
        Some(0)
    };

    // A closed contour made only of off-curve points is a TrueType
    // quadratic loop with implied on-curve points.
    let Some(start) = start else {
        append_offcurve_loop(nodes, path);
        return;
    };

    let len = nodes.len();
    path.move_to(nodes[start].point());

    let steps = if closed { len } else { len - 1 };
    let mut pending: Vec<Point> = Vec::new();
    for step in 1..=steps {
        let node = &nodes[(start + step) % len];
        let end = node.point();
        match node.point_type {
            PointType::OffCurve => pending.push(end),
            PointType::Move | PointType::Line => {
                pending.clear();
                path.line_to(end);
            }
            PointType::Curve => {
                match pending.as_slice() {
                    [] => path.line_to(end),
                    [c] => path.quad_to(*c, end),
                    [c1, .., c2] => path.curve_to(*c1, *c2, end),
                }
                pending.clear();
            }
            PointType::QCurve => {
                append_quad_run(&pending, end, path);
                pending.clear();
            }
        }
    }

    if closed {
        path.close_path();
    }
}

fn append_quad_run(controls: &[Point], end: Point, path: &mut BezPath) {
    let Some((last, rest)) = controls.split_last() else {
        path.line_to(end);
        return;
    };
    for (i, control) in rest.iter().enumerate() {
        let implied = control.midpoint(controls[i + 1]);
        path.quad_to(*control, implied);
    }
    path.quad_to(*last, end);
}

fn append_offcurve_loop(nodes: &[Node], path: &mut BezPath) {
    let len = nodes.len();
    let first = nodes[0].point();
    let last = nodes[len - 1].point();
    path.move_to(last.midpoint(first));
    for i in 0..len {
        let control = nodes[i].point();
        let next = nodes[(i + 1) % len].point();
        path.quad_to(control, control.midpoint(next));
    }
    path.close_path();
}
