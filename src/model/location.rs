// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Positions in variable-font design space.

use crate::settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis name -> user-space value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLocation(BTreeMap<String, f64>);

impl AxisLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, axis: impl Into<String>, value: f64) -> Self {
        self.0.insert(axis.into(), value);
        self
    }

    pub fn set(&mut self, axis: impl Into<String>, value: f64) {
        self.0.insert(axis.into(), value);
    }

    pub fn get(&self, axis: &str) -> Option<f64> {
        self.0.get(axis).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(axis, value)| (axis.as_str(), *value))
    }

    /// Exact match on every axis named by either location (small epsilon
    /// for float comparison)
    pub fn matches(&self, other: &AxisLocation) -> bool {
        let covered = |a: &AxisLocation, b: &AxisLocation| {
            a.0.iter().all(|(axis, &value)| match b.0.get(axis) {
                Some(&other_value) => (value - other_value).abs() <= settings::designspace::LOCATION_EPSILON,
                None => false,
            })
        };
        covered(self, other) && covered(other, self)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for AxisLocation {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(axis, value)| (axis.into(), value)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_exact_up_to_epsilon() {
        let master = AxisLocation::new().with("Weight", 400.0);
        assert!(master.matches(&AxisLocation::new().with("Weight", 400.0005)));
        assert!(!master.matches(&AxisLocation::new().with("Weight", 401.0)));
    }

    #[test]
    fn missing_axes_do_not_match() {
        let master = AxisLocation::new().with("Weight", 400.0).with("Width", 100.0);
        let location = AxisLocation::new().with("Weight", 400.0);
        assert!(!master.matches(&location));
        assert!(!location.matches(&master));
    }

    #[test]
    fn empty_locations_match() {
        assert!(AxisLocation::new().matches(&AxisLocation::new()));
    }

    #[test]
    fn collect_from_pairs() {
        let location: AxisLocation = vec![("Weight", 700.0)].into_iter().collect();
        assert_eq!(location.get("Weight"), Some(700.0));
        assert_eq!(location.get("Width"), None);
    }
}
