// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! UFO storage wrapping `norad` types for shared access.
//!
//! `Workspace` loads one `.ufo` source and keeps every glyph of its default
//! layer as owned [`LayerData`]. It is shared through
//! `Arc<RwLock<Workspace>>`; the `read_workspace` / `write_workspace`
//! helpers at the bottom of this file acquire the lock with poison recovery.
//! Edits stay in memory until [`Workspace::save`] is called.

use super::layer::{Anchor, LayerData, Node, PointType, Shape};
use anyhow::{Context, Result};
use kurbo::Affine;
use norad::{Font, Glyph as NoradGlyph};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A glyph of the workspace: its cmap entries and its outline
#[derive(Debug, Clone)]
pub struct Glyph {
    pub name: String,
    pub codepoints: Vec<char>,
    pub layer: LayerData,
}

/// A loaded UFO font
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Path to the UFO directory
    pub path: PathBuf,

    /// Name of the font family
    pub family_name: String,

    /// Style name (e.g., "Regular", "Bold")
    pub style_name: String,

    /// All glyphs, indexed by name
    pub glyphs: HashMap<String, Glyph>,

    /// Font metrics
    pub units_per_em: Option<f64>,
    pub ascender: Option<f64>,
    pub descender: Option<f64>,

    /// Set by in-memory edits, cleared by a successful save
    pub modified: bool,
}

impl Workspace {
    /// An empty in-memory workspace (nothing on disk yet)
    pub fn new(path: impl Into<PathBuf>, family_name: &str, style_name: &str) -> Self {
        Self {
            path: path.into(),
            family_name: family_name.to_string(),
            style_name: style_name.to_string(),
            glyphs: HashMap::new(),
            units_per_em: None,
            ascender: None,
            descender: None,
            modified: false,
        }
    }

    /// Load a UFO from a directory path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let font =
            Font::load(path).with_context(|| format!("Failed to load UFO from {:?}", path))?;

        let family_name = font
            .font_info
            .family_name
            .clone()
            .unwrap_or_else(|| "Untitled Font".to_string());

        let style_name = font
            .font_info
            .style_name
            .clone()
            .unwrap_or_else(|| "Regular".to_string());

        let mut glyphs = HashMap::new();
        for norad_glyph in font.default_layer().iter() {
            let glyph = Self::convert_glyph(norad_glyph);
            glyphs.insert(glyph.name.clone(), glyph);
        }

        tracing::info!(
            "Loaded {} glyphs from {} ({} {})",
            glyphs.len(),
            path.display(),
            family_name,
            style_name
        );

        Ok(Self {
            path: path.to_path_buf(),
            family_name,
            style_name,
            glyphs,
            units_per_em: font.font_info.units_per_em.map(|n| n.as_f64()),
            ascender: font.font_info.ascender,
            descender: font.font_info.descender,
            modified: false,
        })
    }

    /// Convert a norad Glyph to our internal Glyph
    fn convert_glyph(norad_glyph: &NoradGlyph) -> Glyph {
        let mut shapes: Vec<Shape> = norad_glyph
            .contours
            .iter()
            .map(Self::convert_contour)
            .collect();

        shapes.extend(norad_glyph.components.iter().map(|component| {
            let t = &component.transform;
            let transform = Affine::new([
                t.x_scale, t.xy_scale, t.yx_scale, t.y_scale, t.x_offset, t.y_offset,
            ]);
            Shape::component(component.base.to_string(), transform)
        }));

        let anchors = norad_glyph
            .anchors
            .iter()
            .map(|anchor| {
                let name = anchor.name.as_ref().map(|n| n.to_string()).unwrap_or_default();
                Anchor::new(name, anchor.x, anchor.y)
            })
            .collect();

        Glyph {
            name: norad_glyph.name().to_string(),
            codepoints: norad_glyph.codepoints.iter().collect(),
            layer: LayerData {
                shapes,
                anchors,
                width: norad_glyph.width,
                is_interpolated: false,
            },
        }
    }

    /// Convert a norad contour to a path shape
    fn convert_contour(norad_contour: &norad::Contour) -> Shape {
        let nodes: Vec<Node> = norad_contour
            .points
            .iter()
            .map(|pt| Node {
                x: pt.x,
                y: pt.y,
                point_type: Self::convert_point_type(&pt.typ),
                smooth: pt.smooth,
            })
            .collect();

        // UFO open contours start with a move point
        let closed = nodes
            .first()
            .is_none_or(|n| n.point_type != PointType::Move);

        Shape::Path { nodes, closed }
    }

    /// Convert a norad PointType to our internal PointType
    fn convert_point_type(typ: &norad::PointType) -> PointType {
        match typ {
            norad::PointType::Move => PointType::Move,
            norad::PointType::Line => PointType::Line,
            norad::PointType::OffCurve => PointType::OffCurve,
            norad::PointType::Curve => PointType::Curve,
            norad::PointType::QCurve => PointType::QCurve,
        }
    }

    /// Get a list of all glyph names, sorted by Unicode codepoint
    pub fn glyph_names(&self) -> Vec<String> {
        let mut glyph_list: Vec<_> = self.glyphs.values().collect();
        glyph_list.sort_by(|a, b| match (a.codepoints.first(), b.codepoints.first()) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        glyph_list.into_iter().map(|g| g.name.clone()).collect()
    }

    /// Name of the glyph mapped to a character
    pub fn glyph_for_char(&self, c: char) -> Option<&str> {
        self.glyphs
            .values()
            .find(|g| g.codepoints.contains(&c))
            .map(|g| g.name.as_str())
    }

    /// Outline of a glyph, as stored (components unresolved)
    pub fn layer_data(&self, name: &str) -> Option<&LayerData> {
        self.glyphs.get(name).map(|g| &g.layer)
    }

    /// Replace a glyph's outline. Returns false for unknown glyphs.
    pub fn update_layer_data(&mut self, name: &str, layer: &LayerData) -> bool {
        let Some(glyph) = self.glyphs.get_mut(name) else {
            return false;
        };

        let mut stored = layer.clone();
        stored.is_interpolated = false;
        for shape in &mut stored.shapes {
            if let Shape::Component { resolved, .. } = shape {
                *resolved = None;
            }
        }
        glyph.layer = stored;
        self.modified = true;
        true
    }

    /// Add or replace a whole glyph
    pub fn insert_glyph(&mut self, glyph: Glyph) {
        self.glyphs.insert(glyph.name.clone(), glyph);
        self.modified = true;
    }

    /// Save the UFO back to disk
    pub fn save(&mut self) -> Result<()> {
        // Load the original font to preserve metadata we don't edit
        let mut font = if self.path.exists() {
            Font::load(&self.path)
                .with_context(|| format!("Failed to load UFO for saving: {:?}", self.path))?
        } else {
            Font::new()
        };

        let default_layer = font.default_layer_mut();
        for (name, glyph) in &self.glyphs {
            let norad_glyph = Self::to_norad_glyph(glyph)?;
            if default_layer.contains_glyph(name) {
                default_layer.remove_glyph(name);
            }
            default_layer.insert_glyph(norad_glyph);
        }

        font.save(&self.path)
            .with_context(|| format!("Failed to save UFO to {:?}", self.path))?;

        self.modified = false;
        tracing::info!("Saved {}", self.path.display());
        Ok(())
    }

    /// Convert our internal Glyph to norad Glyph
    fn to_norad_glyph(glyph: &Glyph) -> Result<NoradGlyph> {
        let mut norad_glyph = NoradGlyph::new(&glyph.name);
        norad_glyph.width = glyph.layer.width;

        for &cp in &glyph.codepoints {
            norad_glyph.codepoints.insert(cp);
        }

        for shape in &glyph.layer.shapes {
            match shape {
                Shape::Path { nodes, closed } => {
                    norad_glyph.contours.push(Self::to_norad_contour(nodes, *closed));
                }
                Shape::Component {
                    reference,
                    transform,
                    ..
                } => {
                    let coeffs = transform.as_coeffs();
                    let transform = norad::AffineTransform {
                        x_scale: coeffs[0],
                        xy_scale: coeffs[1],
                        yx_scale: coeffs[2],
                        y_scale: coeffs[3],
                        x_offset: coeffs[4],
                        y_offset: coeffs[5],
                    };
                    let base = norad::Name::new(reference)
                        .with_context(|| format!("Invalid component base name '{}'", reference))?;
                    norad_glyph
                        .components
                        .push(norad::Component::new(base, transform, None, None));
                }
            }
        }

        for anchor in &glyph.layer.anchors {
            let name = if anchor.name.is_empty() {
                None
            } else {
                norad::Name::new(&anchor.name).ok()
            };
            norad_glyph
                .anchors
                .push(norad::Anchor::new(anchor.x, anchor.y, name, None, None, None));
        }

        Ok(norad_glyph)
    }

    /// Convert a path shape to a norad Contour
    fn to_norad_contour(nodes: &[Node], closed: bool) -> norad::Contour {
        let points = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let typ = match node.point_type {
                    PointType::Move if closed => norad::PointType::Line,
                    PointType::Move => norad::PointType::Move,
                    _ if i == 0 && !closed => norad::PointType::Move,
                    PointType::Line => norad::PointType::Line,
                    PointType::OffCurve => norad::PointType::OffCurve,
                    PointType::Curve => norad::PointType::Curve,
                    PointType::QCurve => norad::PointType::QCurve,
                };
                norad::ContourPoint::new(node.x, node.y, typ, node.smooth, None, None, None)
            })
            .collect();

        norad::Contour::new(points, None, None)
    }
}

// ============================================================================
// RWLOCK HELPERS
// ============================================================================

/// Acquire a read lock on a shared workspace, recovering from poison.
pub fn read_workspace(ws: &Arc<RwLock<Workspace>>) -> RwLockReadGuard<'_, Workspace> {
    ws.read().unwrap_or_else(|poisoned| {
        tracing::warn!("Workspace RwLock was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Acquire a write lock on a shared workspace, recovering from poison.
///
/// See [`read_workspace`] for details on poison recovery.
pub fn write_workspace(ws: &Arc<RwLock<Workspace>>) -> RwLockWriteGuard<'_, Workspace> {
    ws.write().unwrap_or_else(|poisoned| {
        tracing::warn!("Workspace RwLock was poisoned, recovering");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayerKey;
    use crate::test_support::square;

    fn sample_workspace(path: &Path) -> Workspace {
        let mut ws = Workspace::new(path, "Test Sans", "Regular");
        ws.insert_glyph(Glyph {
            name: "a".to_string(),
            codepoints: vec!['a'],
            layer: LayerData {
                shapes: vec![square(50.0, 0.0, 400.0)],
                anchors: vec![Anchor::new("top", 250.0, 500.0)],
                width: 500.0,
                is_interpolated: false,
            },
        });
        ws.insert_glyph(Glyph {
            name: "aacute".to_string(),
            codepoints: vec!['á'],
            layer: LayerData {
                shapes: vec![
                    Shape::component("a", Affine::IDENTITY),
                    Shape::component("a", Affine::translate((50.0, 100.0))),
                ],
                ..LayerData::new(500.0)
            },
        });
        ws
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Test.ufo");
        let mut ws = sample_workspace(&path);
        ws.save().unwrap();
        assert!(!ws.modified);

        let loaded = Workspace::load(&path).unwrap();
        let a = loaded.layer_data("a").unwrap();
        assert_eq!(a.width, 500.0);
        assert_eq!(a.anchors, vec![Anchor::new("top", 250.0, 500.0)]);
        assert!(matches!(&a.shapes[0], Shape::Path { nodes, closed: true } if nodes.len() == 4));

        let aacute = loaded.layer_data("aacute").unwrap();
        assert_eq!(
            aacute.component_transform(1),
            Some(Affine::translate((50.0, 100.0)))
        );
        assert_eq!(loaded.glyph_for_char('á'), Some("aacute"));
    }

    #[test]
    fn update_strips_resolution_state() {
        let mut ws = sample_workspace(Path::new("/unused.ufo"));
        ws.modified = false;

        let mut edited = ws.layer_data("aacute").unwrap().clone();
        if let Shape::Component { resolved, .. } = &mut edited.shapes[0] {
            *resolved = Some(LayerKey::new("a", "Regular"));
        }
        edited.is_interpolated = true;

        assert!(ws.update_layer_data("aacute", &edited));
        assert!(ws.modified);
        let stored = ws.layer_data("aacute").unwrap();
        assert!(!stored.is_interpolated);
        assert_eq!(stored.shapes[0], Shape::component("a", Affine::IDENTITY));
    }

    #[test]
    fn update_unknown_glyph_is_rejected() {
        let mut ws = sample_workspace(Path::new("/unused.ufo"));
        assert!(!ws.update_layer_data("missing", &LayerData::new(0.0)));
    }

    #[test]
    fn glyph_names_sorted_by_codepoint() {
        let ws = sample_workspace(Path::new("/unused.ufo"));
        assert_eq!(ws.glyph_names(), vec!["a".to_string(), "aacute".to_string()]);
    }
}
