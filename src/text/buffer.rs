// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Logical text buffer with a cursor and an optional selection.
//!
//! Offsets count Unicode scalar values. The selection is the range between
//! the anchor (where the selection started) and the cursor.
//!
//! Invariants:
//! - 0 <= cursor <= len
//! - 0 <= anchor <= len when present

use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    chars: Vec<char>,
    cursor: usize,
    anchor: Option<usize>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            cursor: chars.len(),
            chars,
            anchor: None,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole text. The cursor is clamped and the selection
    /// cleared.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.cursor.min(self.chars.len());
        self.anchor = None;
    }

    /// Place the cursor, collapsing any selection
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position.min(self.len());
        self.anchor = None;
    }

    /// Selected range, `None` when collapsed
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        match anchor.cmp(&self.cursor) {
            std::cmp::Ordering::Less => Some(anchor..self.cursor),
            std::cmp::Ordering::Greater => Some(self.cursor..anchor),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Select `range`, leaving the cursor at its end
    pub fn set_selection(&mut self, range: Range<usize>) {
        let len = self.len();
        self.anchor = Some(range.start.min(len));
        self.cursor = range.end.min(len);
    }

    pub fn select_all(&mut self) {
        self.set_selection(0..self.len());
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection().map(|range| self.chars[range].iter().collect())
    }

    /// Remove the selected text, leaving the cursor at its start.
    ///
    /// Returns false when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.cursor = range.start;
        self.chars.drain(range);
        self.anchor = None;
        true
    }

    /// Insert text at the cursor, replacing the selection
    pub fn insert_str(&mut self, text: &str) {
        self.delete_selection();
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(self.cursor..self.cursor, inserted);
        self.cursor += count;
    }

    /// Backspace: the selection, or the character before the cursor
    pub fn delete_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Delete key: the selection, or the character after the cursor
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    /// Remove and return the selected text
    pub fn cut(&mut self) -> Option<String> {
        let text = self.selected_text()?;
        self.delete_selection();
        Some(text)
    }

    /// Move one character backward in logical order.
    ///
    /// Without `extend`, an existing selection collapses to its start.
    pub fn move_left(&mut self, extend: bool) {
        if !extend && let Some(range) = self.selection() {
            self.set_cursor(range.start);
            return;
        }
        let target = self.cursor.saturating_sub(1);
        self.move_to(target, extend);
    }

    /// Move one character forward in logical order.
    ///
    /// Without `extend`, an existing selection collapses to its end.
    pub fn move_right(&mut self, extend: bool) {
        if !extend && let Some(range) = self.selection() {
            self.set_cursor(range.end);
            return;
        }
        let target = (self.cursor + 1).min(self.len());
        self.move_to(target, extend);
    }

    pub fn move_to_start(&mut self, extend: bool) {
        self.move_to(0, extend);
    }

    pub fn move_to_end(&mut self, extend: bool) {
        self.move_to(self.len(), extend);
    }

    fn move_to(&mut self, target: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = target.min(self.len());
    }
}
