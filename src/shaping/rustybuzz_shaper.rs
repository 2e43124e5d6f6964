// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Shaping backend built on rustybuzz.

use super::{FeatureSetting, ShapedGlyph, TextDirection};
use crate::error::ShapingError;
use crate::host::ShapingCapability;

/// Shapes runs with rustybuzz against compiled font bytes.
///
/// rustybuzz reports clusters as UTF-8 byte offsets; they are converted to
/// character offsets before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustybuzzShaper;

impl RustybuzzShaper {
    pub fn new() -> Self {
        Self
    }

    fn features(features: &[FeatureSetting]) -> Vec<rustybuzz::Feature> {
        features
            .iter()
            .map(|feature| {
                let tag = rustybuzz::ttf_parser::Tag::from_bytes(&feature.tag);
                rustybuzz::Feature::new(tag, u32::from(feature.enabled), ..)
            })
            .collect()
    }
}

impl ShapingCapability for RustybuzzShaper {
    fn shape(
        &self,
        font_bytes: &[u8],
        text: &str,
        direction: TextDirection,
        features: &[FeatureSetting],
    ) -> Result<Vec<ShapedGlyph>, ShapingError> {
        let face = rustybuzz::Face::from_slice(font_bytes, 0).ok_or(ShapingError::InvalidFont)?;

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(match direction {
            TextDirection::LeftToRight => rustybuzz::Direction::LeftToRight,
            TextDirection::RightToLeft => rustybuzz::Direction::RightToLeft,
        });
        buffer.guess_segment_properties();

        let glyph_buffer = rustybuzz::shape(&face, &Self::features(features), buffer);

        let char_offsets = char_offsets_by_byte(text);

        let glyphs = glyph_buffer
            .glyph_infos()
            .iter()
            .zip(glyph_buffer.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: byte_cluster_to_char(&char_offsets, info.cluster as usize),
                x_advance: f64::from(pos.x_advance),
                x_offset: f64::from(pos.x_offset),
                y_offset: f64::from(pos.y_offset),
            })
            .collect();

        Ok(glyphs)
    }
}

/// Character offset for every byte offset of `text`, plus one entry for
/// the end of the text. Continuation bytes map to their character.
fn char_offsets_by_byte(text: &str) -> Vec<usize> {
    let mut offsets = vec![0usize; text.len() + 1];
    for (char_index, (byte_index, ch)) in text.char_indices().enumerate() {
        offsets[byte_index..byte_index + ch.len_utf8()].fill(char_index);
    }
    offsets[text.len()] = text.chars().count();
    offsets
}

/// Out-of-range clusters clamp to the end of the text
fn byte_cluster_to_char(offsets: &[usize], byte: usize) -> usize {
    offsets.get(byte).or(offsets.last()).copied().unwrap_or_default()
}
