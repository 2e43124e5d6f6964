// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! OpenType feature toggles and the default state of common features

use serde::Serialize;
use std::collections::BTreeMap;

/// Features a shaper applies unless the feature string turns them off
pub const DEFAULT_ON_FEATURES: [&str; 6] = ["calt", "clig", "liga", "kern", "cpsp", "locl"];

/// Discretionary features, applied only when the feature string asks
pub const DEFAULT_OFF_FEATURES: [&str; 17] = [
    "dlig", "hlig", "salt", "swsh", "smcp", "c2sc", "case", "onum", "lnum", "pnum", "tnum", "frac", "zero",
    "sups", "subs", "ordn", "ss01",
];

const FEATURE_DESCRIPTIONS: [(&str, &str); 23] = [
    ("calt", "Contextual Alternates"),
    ("clig", "Contextual Ligatures"),
    ("liga", "Standard Ligatures"),
    ("kern", "Kerning"),
    ("cpsp", "Capital Spacing"),
    ("locl", "Localized Forms"),
    ("dlig", "Discretionary Ligatures"),
    ("hlig", "Historical Ligatures"),
    ("salt", "Stylistic Alternates"),
    ("swsh", "Swash"),
    ("smcp", "Small Capitals"),
    ("c2sc", "Small Capitals From Capitals"),
    ("case", "Case-Sensitive Forms"),
    ("onum", "Oldstyle Figures"),
    ("lnum", "Lining Figures"),
    ("pnum", "Proportional Figures"),
    ("tnum", "Tabular Figures"),
    ("frac", "Fractions"),
    ("zero", "Slashed Zero"),
    ("sups", "Superscript"),
    ("subs", "Subscript"),
    ("ordn", "Ordinals"),
    ("ss01", "Stylistic Set 1"),
];

/// An OpenType feature switched on or off for the whole text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FeatureSetting {
    pub tag: [u8; 4],
    pub enabled: bool,
}

impl FeatureSetting {
    pub fn tag_str(&self) -> &str {
        std::str::from_utf8(&self.tag).unwrap_or("????")
    }
}

/// Parse a feature string of comma-separated `tag=0|1` pairs.
///
/// A bare tag means enabled. Malformed entries are skipped with a warning.
pub fn parse_features(source: &str) -> Vec<FeatureSetting> {
    source
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (tag, value) = match entry.split_once('=') {
                Some((tag, value)) => (tag.trim(), value.trim()),
                None => (entry, "1"),
            };
            let enabled = match value {
                "1" => true,
                "0" => false,
                _ => {
                    tracing::warn!("Ignoring feature '{}': value must be 0 or 1", entry);
                    return None;
                }
            };
            let Ok(tag) = <[u8; 4]>::try_from(tag.as_bytes()) else {
                tracing::warn!("Ignoring feature '{}': tag must be four bytes", entry);
                return None;
            };
            Some(FeatureSetting { tag, enabled })
        })
        .collect()
}

/// Which features are on by default, which are discretionary, and what
/// each tag means. Serializes to the JSON shape hosts show in a feature
/// panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub default_on: Vec<String>,
    pub default_off: Vec<String>,
    pub descriptions: BTreeMap<String, String>,
}

impl Default for FeatureInfo {
    fn default() -> Self {
        Self {
            default_on: DEFAULT_ON_FEATURES.iter().map(|tag| tag.to_string()).collect(),
            default_off: DEFAULT_OFF_FEATURES.iter().map(|tag| tag.to_string()).collect(),
            descriptions: FEATURE_DESCRIPTIONS
                .iter()
                .map(|(tag, text)| (tag.to_string(), text.to_string()))
                .collect(),
        }
    }
}

impl FeatureInfo {
    pub fn description(&self, tag: &str) -> Option<&str> {
        self.descriptions.get(tag).map(String::as_str)
    }

    pub fn is_default_on(&self, tag: &str) -> bool {
        self.default_on.iter().any(|t| t == tag)
    }

    /// Effective state of every known feature once `settings` are applied.
    ///
    /// Known features come first in default-on then default-off order;
    /// settings for other tags follow in the order given. A later setting
    /// for the same tag wins.
    pub fn effective(&self, settings: &[FeatureSetting]) -> Vec<FeatureSetting> {
        let mut states: Vec<FeatureSetting> = self
            .default_on
            .iter()
            .map(|tag| (tag, true))
            .chain(self.default_off.iter().map(|tag| (tag, false)))
            .filter_map(|(tag, enabled)| {
                let tag = <[u8; 4]>::try_from(tag.as_bytes()).ok()?;
                Some(FeatureSetting { tag, enabled })
            })
            .collect();

        for setting in settings {
            match states.iter_mut().find(|state| state.tag == setting.tag) {
                Some(state) => state.enabled = setting.enabled,
                None => states.push(*setting),
            }
        }
        states
    }
}
