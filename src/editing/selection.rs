// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Immutable selection sets for points, anchors and components.
//!
//! `Selection` wraps an `Arc<BTreeSet<T>>` so it can be cheaply cloned into
//! component stack frames. Mutations produce a new set (copy-on-write via
//! `Arc::make_mut`). The `BTreeSet` gives deterministic iteration order,
//! which matters for multi-item operations like nudging.

use crate::model::PointRef;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A set of selected items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T: Ord> {
    inner: Arc<BTreeSet<T>>,
}

impl<T: Ord + Clone> Selection<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeSet::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.inner.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }

    pub fn insert(&mut self, item: T) {
        Arc::make_mut(&mut self.inner).insert(item);
    }

    pub fn remove(&mut self, item: &T) {
        if self.inner.contains(item) {
            Arc::make_mut(&mut self.inner).remove(item);
        }
    }

    /// Add `item` if absent, remove it if present
    pub fn toggle(&mut self, item: T) {
        let set = Arc::make_mut(&mut self.inner);
        if !set.remove(&item) {
            set.insert(item);
        }
    }

    pub fn clear(&mut self) {
        if !self.inner.is_empty() {
            self.inner = Arc::new(BTreeSet::new());
        }
    }
}

impl<T: Ord + Clone> Default for Selection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One selectable thing in the layer under edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedItem {
    Point(PointRef),
    /// Index into the layer's anchors
    Anchor(usize),
    /// Index into the layer's shapes
    Component(usize),
}

/// Everything selected in the current editing context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineSelection {
    pub points: Selection<PointRef>,
    pub anchors: Selection<usize>,
    pub components: Selection<usize>,
}

impl OutlineSelection {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.anchors.is_empty() && self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.anchors.len() + self.components.len()
    }

    pub fn contains(&self, item: SelectedItem) -> bool {
        match item {
            SelectedItem::Point(point) => self.points.contains(&point),
            SelectedItem::Anchor(index) => self.anchors.contains(&index),
            SelectedItem::Component(index) => self.components.contains(&index),
        }
    }

    pub fn insert(&mut self, item: SelectedItem) {
        match item {
            SelectedItem::Point(point) => self.points.insert(point),
            SelectedItem::Anchor(index) => self.anchors.insert(index),
            SelectedItem::Component(index) => self.components.insert(index),
        }
    }

    pub fn toggle(&mut self, item: SelectedItem) {
        match item {
            SelectedItem::Point(point) => self.points.toggle(point),
            SelectedItem::Anchor(index) => self.anchors.toggle(index),
            SelectedItem::Component(index) => self.components.toggle(index),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.anchors.clear();
        self.components.clear();
    }

    /// Replace the whole selection with `item`
    pub fn select_only(&mut self, item: SelectedItem) {
        self.clear();
        self.insert(item);
    }
}
