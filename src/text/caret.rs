// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Logical offset <-> screen x conversion over a cluster map.

use super::cluster::{ClusterMapEntry, ShapedText};
use kurbo::Point;

/// Vertical extent of the line, used for click distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascender: f64,
    pub descender: f64,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            ascender: 800.0,
            descender: -200.0,
        }
    }
}

impl LineMetrics {
    /// Vertical distance from `y` to the [descender, ascender] band
    fn vertical_distance(&self, y: f64) -> f64 {
        if y > self.ascender {
            y - self.ascender
        } else if y < self.descender {
            self.descender - y
        } else {
            0.0
        }
    }
}

/// X position of the caret at logical `position`.
///
/// At a cluster's logical start the caret sits on the cluster's leading
/// edge in reading direction: the left edge for LTR, the right edge for
/// RTL. Inside a multi-character cluster it is interpolated.
pub fn caret_x(shaped: &ShapedText, position: usize) -> f64 {
    if let Some(cluster) = shaped.cluster_at(position) {
        let fraction = (position - cluster.logical_start) as f64 / cluster.char_count() as f64;
        return cluster.x_at(fraction);
    }

    // Past the end: trailing edge of the logically last cluster
    shaped
        .clusters
        .iter()
        .max_by_key(|c| c.logical_end)
        .map(|c| c.x_at(1.0))
        .unwrap_or(0.0)
}

/// Every caret candidate of a cluster: its start, its end and the evenly
/// spaced interior offsets of a multi-character cluster
fn candidates(cluster: &ClusterMapEntry) -> impl Iterator<Item = (usize, f64)> + '_ {
    let count = cluster.char_count();
    (0..=count).map(move |step| {
        let fraction = step as f64 / count as f64;
        (cluster.logical_start + step, cluster.x_at(fraction))
    })
}

/// Logical offset nearest to a click, or `None` when every candidate is
/// farther than `max_distance`.
///
/// Clusters are visited in visual order; the first of several equally
/// near candidates wins.
pub fn position_at_point(
    shaped: &ShapedText,
    point: Point,
    metrics: LineMetrics,
    max_distance: f64,
) -> Option<usize> {
    let dy = metrics.vertical_distance(point.y);

    let mut best: Option<(usize, f64)> = None;
    for cluster in &shaped.clusters {
        for (position, x) in candidates(cluster) {
            let distance = (point.x - x).hypot(dy);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((position, distance));
            }
        }
    }

    match best {
        Some((position, distance)) if distance <= max_distance => Some(position),
        Some((_, distance)) => {
            tracing::debug!("Click {:.0} units from nearest caret, ignoring", distance);
            None
        }
        None => None,
    }
}

/// How a glyph relates to the characters of its cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphOrigin {
    /// Corresponds to the character at this logical offset
    Typed { char_index: usize },
    /// Produced by shaping (ligature part, inserted mark) inside the
    /// cluster starting at this offset
    Synthesized { cluster_start: usize },
}

/// Classify the glyph at visual index `glyph_index`.
///
/// The glyph's position counted from the cluster's logically first glyph
/// is compared with the cluster's character count: positions below it are
/// treated as typed characters. This is a heuristic; it does not follow
/// grapheme cluster boundaries.
pub fn glyph_origin(shaped: &ShapedText, glyph_index: usize) -> Option<GlyphOrigin> {
    let cluster = shaped.clusters.get(shaped.cluster_of_glyph(glyph_index)?)?;
    let position = cluster.logical_glyphs().position(|g| g == glyph_index)?;

    if position < cluster.char_count() {
        Some(GlyphOrigin::Typed {
            char_index: cluster.logical_start + position,
        })
    } else {
        Some(GlyphOrigin::Synthesized {
            cluster_start: cluster.logical_start,
        })
    }
}
