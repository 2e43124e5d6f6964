// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Linear interpolation between point-compatible masters.
//!
//! Only one axis may vary across the masters. The two masters bracketing
//! the requested value along that axis are blended; values outside the
//! masters' range clamp to the nearest master.

use super::arena::{LayerArena, ResolvedLayer};
use super::designspace::{DesignspaceProject, Master};
use super::layer::{Anchor, LayerData, LayerKey, Node, Shape};
use super::location::AxisLocation;
use super::workspace::read_workspace;
use crate::error::{InterpolationError, ProviderError};
use crate::host::InterpolationCapability;
use kurbo::Affine;
use std::sync::Arc;

/// Layer id given to every interpolated result
pub const INTERPOLATED_LAYER: &str = "interpolated";

/// Interpolation capability over a [`DesignspaceProject`]
#[derive(Debug, Clone)]
pub struct MasterInterpolator {
    project: Arc<DesignspaceProject>,
}

impl MasterInterpolator {
    pub fn new(project: Arc<DesignspaceProject>) -> Self {
        Self { project }
    }

    /// The single axis whose value differs between masters
    fn varying_axis(&self, glyph: &str) -> Result<Option<String>, InterpolationError> {
        let mut varying: Vec<String> = Vec::new();
        for master in &self.project.masters {
            for (axis, value) in master.location.iter() {
                let differs = self
                    .project
                    .masters
                    .iter()
                    .any(|other| other.location.get(axis).is_none_or(|v| v != value));
                if differs && !varying.iter().any(|a| a == axis) {
                    varying.push(axis.to_string());
                }
            }
        }

        match varying.len() {
            0 => Ok(None),
            1 => Ok(varying.pop()),
            _ => Err(InterpolationError::Incompatible {
                glyph: glyph.to_string(),
                reason: format!("masters vary along {} axes", varying.len()),
            }),
        }
    }

    /// Masters bracketing `location` along `axis`, with the blend factor
    fn bracket(&self, axis: &str, location: &AxisLocation) -> Option<(&Master, &Master, f64)> {
        let mut sorted: Vec<(&Master, f64)> = self
            .project
            .masters
            .iter()
            .filter_map(|m| m.location.get(axis).map(|v| (m, v)))
            .collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

        let (first, last) = (sorted.first()?, sorted.last()?);
        let target = location
            .get(axis)
            .or_else(|| {
                self.project
                    .axes
                    .iter()
                    .find(|a| a.name == axis)
                    .map(|a| a.default)
            })
            .unwrap_or(first.1);

        if target <= first.1 {
            return Some((first.0, first.0, 0.0));
        }
        if target >= last.1 {
            return Some((last.0, last.0, 0.0));
        }

        sorted.windows(2).find_map(|pair| {
            let ((lo, lo_value), (hi, hi_value)) = (pair[0], pair[1]);
            (lo_value <= target && target <= hi_value).then(|| {
                let span = hi_value - lo_value;
                let t = if span > 0.0 { (target - lo_value) / span } else { 0.0 };
                (lo, hi, t)
            })
        })
    }
}

impl InterpolationCapability for MasterInterpolator {
    fn interpolate_glyph(
        &self,
        glyph: &str,
        location: &AxisLocation,
    ) -> Result<ResolvedLayer, InterpolationError> {
        let Some(default_master) = self.project.masters.first() else {
            return Err(InterpolationError::NoMasters);
        };

        let (lo, hi, t) = match self.varying_axis(glyph)? {
            Some(axis) => self
                .bracket(&axis, location)
                .ok_or(InterpolationError::NoMasters)?,
            None => (default_master, default_master, 0.0),
        };

        tracing::debug!(
            "Interpolating '{}' between '{}' and '{}' at t={:.3}",
            glyph,
            lo.name,
            hi.name,
            t
        );

        let lo_ws = read_workspace(&lo.workspace);
        let hi_ws = read_workspace(&hi.workspace);
        let blend_glyph = |name: &str| -> Result<LayerData, InterpolationError> {
            let a = lo_ws
                .layer_data(name)
                .ok_or_else(|| ProviderError::GlyphNotFound(name.to_string()))?;
            let b = hi_ws
                .layer_data(name)
                .ok_or_else(|| ProviderError::GlyphNotFound(name.to_string()))?;
            blend_layers(a, b, t).map_err(|reason| InterpolationError::Incompatible {
                glyph: name.to_string(),
                reason,
            })
        };

        let mut root = blend_glyph(glyph)?;
        root.is_interpolated = true;

        let root_key = LayerKey::new(glyph, INTERPOLATED_LAYER);
        let mut resolved = LayerArena::resolve(root, &root_key, |key| match blend_glyph(&key.glyph) {
            Ok(mut layer) => {
                layer.is_interpolated = true;
                Some(layer)
            }
            Err(err) => {
                tracing::warn!("Component '{}' not interpolated: {}", key.glyph, err);
                None
            }
        });
        resolved.layer.is_interpolated = true;
        Ok(resolved)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Blend two compatible layers; the error names the incompatibility
fn blend_layers(a: &LayerData, b: &LayerData, t: f64) -> Result<LayerData, String> {
    if a.shapes.len() != b.shapes.len() {
        return Err(format!("{} shapes vs {}", a.shapes.len(), b.shapes.len()));
    }

    let shapes = a
        .shapes
        .iter()
        .zip(&b.shapes)
        .enumerate()
        .map(|(index, pair)| match pair {
            (
                Shape::Path { nodes: na, closed },
                Shape::Path { nodes: nb, .. },
            ) => {
                if na.len() != nb.len() {
                    return Err(format!("contour {} has {} points vs {}", index, na.len(), nb.len()));
                }
                let nodes = na
                    .iter()
                    .zip(nb)
                    .map(|(p, q)| Node {
                        x: lerp(p.x, q.x, t),
                        y: lerp(p.y, q.y, t),
                        point_type: p.point_type,
                        smooth: p.smooth,
                    })
                    .collect();
                Ok(Shape::Path {
                    nodes,
                    closed: *closed,
                })
            }
            (
                Shape::Component {
                    reference: ra,
                    transform: ta,
                    ..
                },
                Shape::Component {
                    reference: rb,
                    transform: tb,
                    ..
                },
            ) if ra == rb => {
                let (ca, cb) = (ta.as_coeffs(), tb.as_coeffs());
                let coeffs: [f64; 6] = std::array::from_fn(|i| lerp(ca[i], cb[i], t));
                Ok(Shape::component(ra.as_str(), Affine::new(coeffs)))
            }
            _ => Err(format!("shape {} differs in kind or reference", index)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let anchors = a
        .anchors
        .iter()
        .filter_map(|anchor| {
            let other = b.anchors.iter().find(|o| o.name == anchor.name)?;
            Some(Anchor::new(
                anchor.name.as_str(),
                lerp(anchor.x, other.x, t),
                lerp(anchor.y, other.y, t),
            ))
        })
        .collect();

    Ok(LayerData {
        shapes,
        anchors,
        width: lerp(a.width, b.width, t),
        is_interpolated: true,
    })
}
