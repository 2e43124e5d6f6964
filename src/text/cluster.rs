// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Cluster map: the link between logical text offsets and visual glyphs.
//!
//! A cluster is a contiguous character range together with the glyphs the
//! shaper produced for it. The entries of a [`ShapedText`] are stored in
//! visual order and their logical ranges partition `[0, text_len)` with no
//! gaps or overlaps.

use crate::error::ShapingError;
use crate::shaping::ShapedGlyph;
use kurbo::Point;
use std::collections::BTreeMap;
use std::ops::Range;

/// One cluster of shaped text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMapEntry {
    /// Index of the cluster's first glyph in visual order
    pub glyph_start: usize,
    pub glyph_count: usize,
    pub logical_start: usize,
    /// Exclusive
    pub logical_end: usize,
    /// Left edge of the cluster (font units from the line start)
    pub visual_x: f64,
    pub visual_width: f64,
    pub is_rtl: bool,
}

impl ClusterMapEntry {
    pub fn char_count(&self) -> usize {
        self.logical_end - self.logical_start
    }

    pub fn glyph_range(&self) -> Range<usize> {
        self.glyph_start..self.glyph_start + self.glyph_count
    }

    pub fn contains_glyph(&self, glyph_index: usize) -> bool {
        self.glyph_range().contains(&glyph_index)
    }

    /// Caret x at a fraction (0 = logical start, 1 = logical end)
    pub fn x_at(&self, fraction: f64) -> f64 {
        if self.is_rtl {
            self.visual_x + self.visual_width * (1.0 - fraction)
        } else {
            self.visual_x + self.visual_width * fraction
        }
    }

    /// Glyph indices of this cluster in logical order
    pub fn logical_glyphs(&self) -> Box<dyn Iterator<Item = usize>> {
        if self.is_rtl {
            Box::new(self.glyph_range().rev())
        } else {
            Box::new(self.glyph_range())
        }
    }
}

/// Result of shaping a whole text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedText {
    /// Glyphs in visual order, clusters rebased to absolute offsets
    pub glyphs: Vec<ShapedGlyph>,
    /// Cluster map in visual order
    pub clusters: Vec<ClusterMapEntry>,
    /// One embedding level per character
    pub levels: Vec<u8>,
    pub text_len: usize,
}

impl ShapedText {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Visual index of the cluster holding `glyph_index`
    pub fn cluster_of_glyph(&self, glyph_index: usize) -> Option<usize> {
        self.clusters.iter().position(|c| c.contains_glyph(glyph_index))
    }

    /// Cluster whose logical range contains `position`
    pub fn cluster_at(&self, position: usize) -> Option<&ClusterMapEntry> {
        self.clusters
            .iter()
            .find(|c| c.logical_start <= position && position < c.logical_end)
    }

    /// Total advance of the line
    pub fn width(&self) -> f64 {
        self.glyphs.iter().map(|g| g.x_advance).sum()
    }

    /// Pen position of every glyph, offsets applied
    pub fn glyph_positions(&self) -> Vec<Point> {
        let mut x = 0.0;
        self.glyphs
            .iter()
            .map(|glyph| {
                let position = Point::new(x + glyph.x_offset, glyph.y_offset);
                x += glyph.x_advance;
                position
            })
            .collect()
    }

    /// Assemble shaped runs into visual order and build the cluster map.
    ///
    /// `groups` maps each absolute cluster start to its glyphs in the order
    /// the shaper returned them. `visual_order` must be a permutation of the
    /// character indices.
    pub fn assemble(
        groups: BTreeMap<usize, Vec<ShapedGlyph>>,
        levels: Vec<u8>,
        visual_order: &[usize],
    ) -> Result<Self, ShapingError> {
        let text_len = levels.len();
        validate_permutation(visual_order, text_len)?;

        let starts: Vec<usize> = groups.keys().copied().collect();
        if starts.is_empty() {
            return Ok(Self {
                levels,
                text_len,
                ..Self::default()
            });
        }

        // Characters before the first cluster belong to it
        let group_of_char: Vec<usize> = (0..text_len)
            .map(|c| starts.partition_point(|&s| s <= c).saturating_sub(1))
            .collect();

        let mut emitted = vec![false; starts.len()];
        let mut glyphs = Vec::new();
        let mut clusters = Vec::with_capacity(starts.len());
        let mut x = 0.0;

        for &char_index in visual_order {
            let group = group_of_char[char_index];
            if emitted[group] {
                continue;
            }
            emitted[group] = true;

            let logical_start = if group == 0 { 0 } else { starts[group] };
            let logical_end = starts.get(group + 1).copied().unwrap_or(text_len);
            let group_glyphs = &groups[&starts[group]];
            let width: f64 = group_glyphs.iter().map(|g| g.x_advance).sum();

            clusters.push(ClusterMapEntry {
                glyph_start: glyphs.len(),
                glyph_count: group_glyphs.len(),
                logical_start,
                logical_end,
                visual_x: x,
                visual_width: width,
                is_rtl: levels[logical_start] % 2 == 1,
            });
            glyphs.extend_from_slice(group_glyphs);
            x += width;
        }

        Ok(Self {
            glyphs,
            clusters,
            levels,
            text_len,
        })
    }
}

fn validate_permutation(order: &[usize], len: usize) -> Result<(), ShapingError> {
    if order.len() != len {
        return Err(ShapingError::InvalidPermutation);
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(ShapingError::InvalidPermutation),
        }
    }
    Ok(())
}
