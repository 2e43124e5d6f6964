// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Jumping between glyphs in logical order.

use super::cluster::{ClusterMapEntry, ShapedText};

/// Direction of travel through the logical text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Forward,
    Backward,
}

/// The glyph logically next to `glyph_index` in `travel` direction.
///
/// Glyphs of the same cluster (base and marks) are visited first. After
/// that the logical offset advances one character at a time until it lands
/// in another cluster, whose first glyph (forward) or last glyph (backward)
/// is returned. `None` at the buffer boundary.
pub fn adjacent_glyph(shaped: &ShapedText, glyph_index: usize, travel: Travel) -> Option<usize> {
    let current = shaped.clusters.get(shaped.cluster_of_glyph(glyph_index)?)?;

    let logical: Vec<usize> = current.logical_glyphs().collect();
    let position = logical.iter().position(|&g| g == glyph_index)?;
    let same_cluster = match travel {
        Travel::Forward => logical.get(position + 1),
        Travel::Backward => position.checked_sub(1).and_then(|p| logical.get(p)),
    };
    if let Some(&glyph) = same_cluster {
        return Some(glyph);
    }

    let mut offset = match travel {
        Travel::Forward => current.logical_end,
        Travel::Backward => current.logical_start.checked_sub(1)?,
    };
    while offset < shaped.text_len {
        if let Some(cluster) = shaped.cluster_at(offset)
            && cluster != current
            && let Some(glyph) = edge_glyph(cluster, travel)
        {
            return Some(glyph);
        }
        offset = match travel {
            Travel::Forward => offset + 1,
            Travel::Backward => offset.checked_sub(1)?,
        };
    }
    None
}

/// First glyph of a cluster in logical order when moving forward, last
/// when moving backward
fn edge_glyph(cluster: &ClusterMapEntry, travel: Travel) -> Option<usize> {
    let mut glyphs = cluster.logical_glyphs();
    match travel {
        Travel::Forward => glyphs.next(),
        Travel::Backward => glyphs.last(),
    }
}

/// Glyph the editor should activate for a cursor at `position`: the
/// logically first glyph of the cluster before the cursor, or of the first
/// cluster when the cursor is at the start
pub fn glyph_at_cursor(shaped: &ShapedText, position: usize) -> Option<usize> {
    let offset = position.saturating_sub(1);
    let cluster = shaped.cluster_at(offset)?;
    cluster.logical_glyphs().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::ShapedGlyph;
    use std::collections::BTreeMap;

    fn shaped(groups: &[(usize, usize)], levels: Vec<u8>, order: &[usize]) -> ShapedText {
        // (cluster, glyph count)
        let groups: BTreeMap<usize, Vec<ShapedGlyph>> = groups
            .iter()
            .map(|&(cluster, count)| {
                (cluster, (0..count).map(|_| ShapedGlyph::new(1, cluster, 100.0)).collect())
            })
            .collect();
        ShapedText::assemble(groups, levels, order).unwrap()
    }

    #[test]
    fn walks_ltr_text_with_marks() {
        // "a" with a mark, then "b"
        let text = shaped(&[(0, 2), (1, 1)], vec![0, 0], &[0, 1]);
        assert_eq!(adjacent_glyph(&text, 0, Travel::Forward), Some(1));
        assert_eq!(adjacent_glyph(&text, 1, Travel::Forward), Some(2));
        assert_eq!(adjacent_glyph(&text, 2, Travel::Forward), None);

        assert_eq!(adjacent_glyph(&text, 2, Travel::Backward), Some(1));
        assert_eq!(adjacent_glyph(&text, 1, Travel::Backward), Some(0));
        assert_eq!(adjacent_glyph(&text, 0, Travel::Backward), None);
    }

    #[test]
    fn walks_rtl_text_in_logical_order() {
        // Two RTL characters; visual order [char 1, char 0]
        let text = shaped(&[(0, 1), (1, 1)], vec![1, 1], &[1, 0]);
        // Visual glyph 1 is char 0, visual glyph 0 is char 1
        assert_eq!(adjacent_glyph(&text, 1, Travel::Forward), Some(0));
        assert_eq!(adjacent_glyph(&text, 0, Travel::Backward), Some(1));
    }

    #[test]
    fn backward_into_rtl_cluster_takes_logical_last_glyph() {
        // RTL base + mark at char 0, then char 1
        let text = shaped(&[(0, 2), (1, 1)], vec![1, 1], &[1, 0]);
        // Visual: [char1 glyph 0][char0 glyphs 1, 2]; logical order of
        // cluster 0 is glyph 2 then glyph 1
        assert_eq!(adjacent_glyph(&text, 0, Travel::Backward), Some(1));
        assert_eq!(adjacent_glyph(&text, 2, Travel::Forward), Some(1));
    }

    #[test]
    fn ligature_is_skipped_as_a_whole() {
        let text = shaped(&[(0, 1), (3, 1)], vec![0; 4], &[0, 1, 2, 3]);
        assert_eq!(adjacent_glyph(&text, 0, Travel::Forward), Some(1));
        assert_eq!(adjacent_glyph(&text, 1, Travel::Backward), Some(0));
    }

    #[test]
    fn glyph_for_cursor() {
        let text = shaped(&[(0, 1), (1, 1)], vec![0, 0], &[0, 1]);
        assert_eq!(glyph_at_cursor(&text, 0), Some(0));
        assert_eq!(glyph_at_cursor(&text, 1), Some(0));
        assert_eq!(glyph_at_cursor(&text, 2), Some(1));
        assert_eq!(glyph_at_cursor(&ShapedText::default(), 0), None);
    }
}
