// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The text engine: buffer, reshaping and cursor resolution.

use super::buffer::TextBuffer;
use super::caret::{self, GlyphOrigin, LineMetrics};
use super::cluster::{ClusterMapEntry, ShapedText};
use super::navigation::{self, Travel};
use crate::error::ShapingError;
use crate::host::{BidiCapability, ShapingCapability, TextPersistence};
use crate::settings::Settings;
use crate::shaping::{FeatureInfo, FeatureSetting, ShapedGlyph, TextDirection, parse_features};
use kurbo::Point;
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

/// Shape `text` run by run and assemble the visual line.
///
/// Runs are maximal spans of equal embedding level. Each run is shaped on
/// its own with the direction its level implies; its clusters are then
/// rebased to absolute character offsets.
pub fn shape_text(
    shaping: &dyn ShapingCapability,
    bidi: &dyn BidiCapability,
    font_bytes: &[u8],
    text: &str,
    features: &[FeatureSetting],
) -> Result<ShapedText, ShapingError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(ShapedText::default());
    }

    let levels = bidi.embedding_levels(text);
    if levels.len() != chars.len() {
        return Err(ShapingError::LevelMismatch {
            expected: chars.len(),
            got: levels.len(),
        });
    }

    let mut groups: BTreeMap<usize, Vec<ShapedGlyph>> = BTreeMap::new();
    for run in level_runs(&levels) {
        let direction = TextDirection::from_level(levels[run.start]);
        let run_text: String = chars[run.clone()].iter().collect();
        let run_len = run.len();

        for mut glyph in shaping.shape(font_bytes, &run_text, direction, features)? {
            if glyph.cluster >= run_len {
                return Err(ShapingError::ClusterOutOfRange {
                    cluster: glyph.cluster,
                    len: run_len,
                });
            }
            glyph.cluster += run.start;
            groups.entry(glyph.cluster).or_default().push(glyph);
        }
    }

    let visual_order = bidi.reordered_indices(text, &levels);
    ShapedText::assemble(groups, levels, &visual_order)
}

/// Maximal ranges of equal embedding level
fn level_runs(levels: &[u8]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=levels.len() {
        if i == levels.len() || levels[i] != levels[start] {
            runs.push(start..i);
            start = i;
        }
    }
    runs
}

/// Text under edit, kept shaped.
///
/// Every mutation reshapes synchronously and reports the new text to the
/// persistence hook, if one is installed.
pub struct TextShaper {
    shaping: Rc<dyn ShapingCapability>,
    bidi: Rc<dyn BidiCapability>,
    persistence: Option<Rc<dyn TextPersistence>>,
    buffer: TextBuffer,
    font_bytes: Option<Arc<Vec<u8>>>,
    features: Vec<FeatureSetting>,
    metrics: LineMetrics,
    click_max_distance: f64,
    shaped: ShapedText,
}

impl TextShaper {
    pub fn new(shaping: Rc<dyn ShapingCapability>, bidi: Rc<dyn BidiCapability>, settings: &Settings) -> Self {
        Self {
            shaping,
            bidi,
            persistence: None,
            buffer: TextBuffer::new(),
            font_bytes: None,
            features: Vec::new(),
            metrics: LineMetrics::default(),
            click_max_distance: settings.click_max_distance,
            shaped: ShapedText::default(),
        }
    }

    pub fn with_persistence(mut self, persistence: Rc<dyn TextPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    // ===== Accessors =====

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn shaped(&self) -> &ShapedText {
        &self.shaped
    }

    pub fn glyphs(&self) -> &[ShapedGlyph] {
        &self.shaped.glyphs
    }

    pub fn clusters(&self) -> &[ClusterMapEntry] {
        &self.shaped.clusters
    }

    pub fn glyph_positions(&self) -> Vec<Point> {
        self.shaped.glyph_positions()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.buffer.selection()
    }

    pub fn features(&self) -> &[FeatureSetting] {
        &self.features
    }

    /// State of every common feature, with defaults filled in for the
    /// ones the feature string leaves out
    pub fn effective_features(&self, info: &FeatureInfo) -> Vec<FeatureSetting> {
        info.effective(&self.features)
    }

    // ===== Shaping inputs =====

    /// Replace the font the text is shaped with
    pub fn set_font_bytes(&mut self, font_bytes: Option<Arc<Vec<u8>>>) {
        self.font_bytes = font_bytes;
        self.reshape();
    }

    /// Set OpenType features from a `tag=0|1,...` string
    pub fn set_features(&mut self, source: &str) {
        self.features = parse_features(source);
        self.reshape();
    }

    /// Line extent used when measuring click distance
    pub fn set_metrics(&mut self, ascender: f64, descender: f64) {
        self.metrics = LineMetrics { ascender, descender };
    }

    /// Replace the text, reshape and persist
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.text_changed();
    }

    /// Shape the current text again.
    ///
    /// Failures leave an empty line and are logged.
    pub fn reshape(&mut self) {
        self.shaped = match self.try_shape() {
            Ok(shaped) => shaped,
            Err(err) => {
                tracing::warn!("Shaping failed: {}", err);
                ShapedText::default()
            }
        };
    }

    fn try_shape(&self) -> Result<ShapedText, ShapingError> {
        if self.buffer.is_empty() {
            return Ok(ShapedText::default());
        }
        let font_bytes = self.font_bytes.as_ref().ok_or(ShapingError::NoFont)?;
        shape_text(
            self.shaping.as_ref(),
            self.bidi.as_ref(),
            font_bytes,
            &self.buffer.text(),
            &self.features,
        )
    }

    fn text_changed(&mut self) {
        self.reshape();
        if let Some(persistence) = &self.persistence {
            persistence.text_changed(&self.buffer.text());
        }
    }

    // ===== Editing =====

    pub fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(text);
        self.text_changed();
    }

    pub fn delete_backward(&mut self) {
        if self.buffer.delete_backward() {
            self.text_changed();
        }
    }

    pub fn delete_forward(&mut self) {
        if self.buffer.delete_forward() {
            self.text_changed();
        }
    }

    /// Remove the selection and return it for the clipboard
    pub fn cut(&mut self) -> Option<String> {
        let text = self.buffer.cut()?;
        self.text_changed();
        Some(text)
    }

    pub fn copy(&self) -> Option<String> {
        self.buffer.selected_text()
    }

    pub fn paste(&mut self, text: &str) {
        self.insert_str(text);
    }

    // ===== Cursor =====

    pub fn set_cursor(&mut self, position: usize) {
        self.buffer.set_cursor(position);
    }

    pub fn move_left(&mut self, extend: bool) {
        self.buffer.move_left(extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        self.buffer.move_right(extend);
    }

    pub fn move_to_start(&mut self, extend: bool) {
        self.buffer.move_to_start(extend);
    }

    pub fn move_to_end(&mut self, extend: bool) {
        self.buffer.move_to_end(extend);
    }

    pub fn select_all(&mut self) {
        self.buffer.select_all();
    }

    /// Caret x for the current cursor
    pub fn cursor_x(&self) -> f64 {
        caret::caret_x(&self.shaped, self.buffer.cursor())
    }

    /// Caret x for any logical offset
    pub fn caret_x(&self, position: usize) -> f64 {
        caret::caret_x(&self.shaped, position)
    }

    /// Logical offset nearest to a point in line space
    pub fn position_at_point(&self, point: Point) -> Option<usize> {
        caret::position_at_point(&self.shaped, point, self.metrics, self.click_max_distance)
    }

    /// Place (or extend to) the caret at a clicked point.
    ///
    /// Returns false when the click was too far from the text; the caller
    /// may treat it as a canvas gesture instead.
    pub fn click(&mut self, point: Point, extend: bool) -> bool {
        let Some(position) = self.position_at_point(point) else {
            return false;
        };
        if extend {
            let anchor = self.buffer.selection().map_or(self.buffer.cursor(), |range| {
                if range.start == self.buffer.cursor() { range.end } else { range.start }
            });
            self.buffer.set_selection(anchor..position);
        } else {
            self.buffer.set_cursor(position);
        }
        true
    }

    // ===== Glyphs =====

    pub fn glyph_origin(&self, glyph_index: usize) -> Option<GlyphOrigin> {
        caret::glyph_origin(&self.shaped, glyph_index)
    }

    pub fn next_glyph(&self, glyph_index: usize) -> Option<usize> {
        navigation::adjacent_glyph(&self.shaped, glyph_index, Travel::Forward)
    }

    pub fn previous_glyph(&self, glyph_index: usize) -> Option<usize> {
        navigation::adjacent_glyph(&self.shaped, glyph_index, Travel::Backward)
    }

    /// Visual index of the glyph to activate for the current cursor
    pub fn glyph_at_cursor(&self) -> Option<usize> {
        navigation::glyph_at_cursor(&self.shaped, self.buffer.cursor())
    }
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("buffer", &self.buffer)
            .field("features", &self.features)
            .field("shaped", &self.shaped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingPersistence, StubBidi, StubShaper};

    fn shaper_with(shaping: StubShaper) -> TextShaper {
        let mut shaper = TextShaper::new(Rc::new(shaping), Rc::new(StubBidi::default()), &Settings::default());
        shaper.set_font_bytes(Some(Arc::new(vec![0u8; 4])));
        shaper
    }

    fn assert_partition(shaper: &TextShaper) {
        let mut ranges: Vec<(usize, usize)> = shaper
            .clusters()
            .iter()
            .map(|c| (c.logical_start, c.logical_end))
            .collect();
        ranges.sort();
        let mut next = 0;
        for (start, end) in ranges {
            assert_eq!(start, next);
            next = end;
        }
        assert_eq!(next, shaper.buffer().len());
    }

    #[test]
    fn ab_shapes_into_two_clusters() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_text("AB");
        let ranges: Vec<(usize, usize)> = shaper
            .clusters()
            .iter()
            .map(|c| (c.logical_start, c.logical_end))
            .collect();
        assert_eq!(ranges, vec![(0, 1), (1, 2)]);

        // Midpoint of B's advance
        let position = shaper.position_at_point(Point::new(750.0, 0.0));
        assert!(matches!(position, Some(1) | Some(2)));
    }

    #[test]
    fn mixed_direction_runs_are_shaped_separately() {
        let shaping = Rc::new(StubShaper::new());
        let mut shaper = TextShaper::new(shaping.clone(), Rc::new(StubBidi::default()), &Settings::default());
        shaper.set_font_bytes(Some(Arc::new(vec![0u8; 4])));
        shaper.set_text("ab\u{05D0}\u{05D1}c");

        let calls = shaping.calls.borrow();
        let last_three: Vec<_> = calls.iter().rev().take(3).rev().cloned().collect();
        assert_eq!(
            last_three,
            vec![
                ("ab".to_string(), TextDirection::LeftToRight),
                ("\u{05D0}\u{05D1}".to_string(), TextDirection::RightToLeft),
                ("c".to_string(), TextDirection::LeftToRight),
            ]
        );

        // Visual order: a b bet alef c
        let clusters: Vec<usize> = shaper.glyphs().iter().map(|g| g.cluster).collect();
        assert_eq!(clusters, vec![0, 1, 3, 2, 4]);
        assert_eq!(shaper.shaped().levels.len(), 5);
        assert_partition(&shaper);
    }

    #[test]
    fn ligature_cluster_covers_its_characters() {
        let mut shaper = shaper_with(StubShaper::new().with_ligature("fi", 900, 600.0));
        shaper.set_text("fix");
        assert_eq!(shaper.glyphs().len(), 2);
        assert_eq!(shaper.clusters()[0].char_count(), 2);
        assert_eq!(shaper.caret_x(1), 300.0);
        assert_partition(&shaper);
    }

    #[test]
    fn shaping_failures_give_an_empty_line() {
        let mut failing = StubShaper::new();
        failing.fail = true;
        let mut shaper = shaper_with(failing);
        shaper.set_text("abc");
        assert!(shaper.glyphs().is_empty());
        assert!(shaper.clusters().is_empty());
        assert_eq!(shaper.cursor_x(), 0.0);
    }

    #[test]
    fn bad_bidi_output_gives_an_empty_line() {
        for bidi in [
            StubBidi { short_levels: true, ..StubBidi::default() },
            StubBidi { broken_permutation: true, ..StubBidi::default() },
        ] {
            let mut shaper = TextShaper::new(Rc::new(StubShaper::new()), Rc::new(bidi), &Settings::default());
            shaper.set_font_bytes(Some(Arc::new(vec![0u8; 4])));
            shaper.set_text("abc");
            assert!(shaper.glyphs().is_empty());
        }
    }

    #[test]
    fn missing_font_gives_an_empty_line() {
        let mut shaper = TextShaper::new(
            Rc::new(StubShaper::new()),
            Rc::new(StubBidi::default()),
            &Settings::default(),
        );
        shaper.set_text("abc");
        assert!(shaper.glyphs().is_empty());
        assert_eq!(shaper.text(), "abc");
    }

    #[test]
    fn edits_reshape_and_persist() {
        let persistence = Rc::new(RecordingPersistence::default());
        let mut shaper = shaper_with(StubShaper::new()).with_persistence(persistence.clone());
        shaper.set_text("hello");
        shaper.set_cursor(5);
        shaper.insert_str("!");
        shaper.delete_backward();
        shaper.delete_backward();

        assert_eq!(shaper.text(), "hell");
        assert_eq!(shaper.glyphs().len(), 4);
        assert_eq!(
            *persistence.texts.borrow(),
            vec!["hello".to_string(), "hello!".to_string(), "hello".to_string(), "hell".to_string()]
        );
    }

    #[test]
    fn delete_at_boundary_does_not_persist() {
        let persistence = Rc::new(RecordingPersistence::default());
        let mut shaper = shaper_with(StubShaper::new()).with_persistence(persistence.clone());
        shaper.set_text("a");
        shaper.set_cursor(0);
        shaper.delete_backward();
        assert_eq!(persistence.texts.borrow().len(), 1);
    }

    #[test]
    fn cut_copy_paste() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_text("abcdef");
        shaper.set_cursor(1);
        shaper.move_right(true);
        shaper.move_right(true);
        assert_eq!(shaper.copy().as_deref(), Some("bc"));
        assert_eq!(shaper.cut().as_deref(), Some("bc"));
        assert_eq!(shaper.text(), "adef");

        shaper.move_to_end(false);
        shaper.paste("bc");
        assert_eq!(shaper.text(), "adefbc");
        assert_eq!(shaper.glyphs().len(), 6);
    }

    #[test]
    fn paste_replaces_selection() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_text("abc");
        shaper.select_all();
        shaper.paste("xy");
        assert_eq!(shaper.text(), "xy");
        assert_eq!(shaper.cursor(), 2);
    }

    #[test]
    fn cursor_round_trip_over_shaped_text() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_text("a\u{05D0}\u{05D1}b");
        for start in 1..4 {
            shaper.set_cursor(start);
            shaper.move_right(false);
            shaper.move_left(false);
            assert_eq!(shaper.cursor(), start);
        }
    }

    #[test]
    fn click_places_and_extends_selection() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_text("abcd");
        assert!(shaper.click(Point::new(490.0, 100.0), false));
        assert_eq!(shaper.cursor(), 1);
        assert!(shaper.click(Point::new(1510.0, 100.0), true));
        assert_eq!(shaper.selection(), Some(1..3));
        assert!(!shaper.click(Point::new(5000.0, 100.0), false));
        assert_eq!(shaper.selection(), Some(1..3));
    }

    #[test]
    fn features_are_passed_on() {
        let mut shaper = shaper_with(StubShaper::new());
        shaper.set_features("liga=0,kern");
        assert_eq!(shaper.features().len(), 2);
        assert!(!shaper.features()[0].enabled);

        let effective = shaper.effective_features(&FeatureInfo::default());
        let enabled = |tag: &[u8; 4]| effective.iter().find(|s| &s.tag == tag).map(|s| s.enabled);
        assert_eq!(enabled(b"liga"), Some(false));
        assert_eq!(enabled(b"calt"), Some(true));
        assert_eq!(enabled(b"smcp"), Some(false));
    }

    #[test]
    fn next_glyph_follows_logical_order() {
        let mut shaper = shaper_with(StubShaper::new().with_mark('a', 2000, 0.0));
        shaper.set_text("ab");
        assert_eq!(shaper.next_glyph(0), Some(1));
        assert_eq!(shaper.glyph_origin(1), Some(GlyphOrigin::Synthesized { cluster_start: 0 }));
        assert_eq!(shaper.next_glyph(1), Some(2));
        assert_eq!(shaper.previous_glyph(2), Some(1));
        shaper.set_cursor(2);
        assert_eq!(shaper.glyph_at_cursor(), Some(2));
    }

    #[test]
    fn level_runs_split_on_level_change() {
        assert_eq!(level_runs(&[0, 0, 1, 1, 0]), vec![0..2, 2..4, 4..5]);
        assert_eq!(level_runs(&[1]), vec![0..1]);
        assert!(level_runs(&[]).is_empty());
    }
}
