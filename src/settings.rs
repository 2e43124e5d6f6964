// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor settings and configuration constants.
//!
//! Fixed behaviour lives in the constants at the top of this file and is
//! re-exported through the small `pub mod` namespaces below. The subset a
//! user may tune lives in [`Settings`], which is loaded from TOML and handed
//! to the camera and editor constructors.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// CAMERA SETTINGS
// ============================================================================
/// Smallest allowed scale (font units to pixels)
const MIN_SCALE: f64 = 0.01;

/// Largest allowed scale (font units to pixels)
const MAX_SCALE: f64 = 100.0;

/// Number of frames in every camera transition
const ANIMATION_FRAMES: u32 = 10;

/// Screen-space margin kept around a glyph when panning to it (pixels)
const PAN_MARGIN: f64 = 60.0;

// ============================================================================
// HIT TESTING SETTINGS
// ============================================================================
/// Hit radius at scale 1.0 (font units); divided by the camera scale
const HIT_RADIUS: f64 = 8.0;

/// Below this determinant magnitude a component transform is not inverted
const SINGULAR_DETERMINANT: f64 = 1e-4;

/// Deepest component nesting followed when building outlines
const MAX_COMPONENT_DEPTH: usize = 32;

// ============================================================================
// TEXT SETTINGS
// ============================================================================
/// Clicks farther than this from every caret candidate place no caret
/// (font units)
const CLICK_MAX_DISTANCE: f64 = 500.0;

// ============================================================================
// NUDGE SETTINGS
// ============================================================================
/// Base nudge amount in design units (arrow key)
const NUDGE_BASE: f64 = 2.0;

/// Shift-arrow nudge amount in design units
const NUDGE_SHIFT: f64 = 8.0;

/// Ctrl/Cmd-arrow nudge amount in design units
const NUDGE_CMD: f64 = 32.0;

// ============================================================================
// WHEEL SETTINGS
// ============================================================================
/// Once classified, the device type sticks for this long (milliseconds)
const WHEEL_DEVICE_LOCK_MS: u64 = 250;

/// Vertical deltas at least this large with no horizontal part look like
/// discrete mouse-wheel ticks (pixels)
const WHEEL_MOUSE_TICK_THRESHOLD: f64 = 50.0;

/// Pixels per line for line-mode wheel deltas
const WHEEL_LINE_HEIGHT: f64 = 16.0;

const WHEEL_TRACKPAD_PAN_SPEED: f64 = 1.0;
const WHEEL_MOUSE_PAN_SPEED: f64 = 0.6;
const WHEEL_TRACKPAD_ZOOM_SPEED: f64 = 0.01;
const WHEEL_MOUSE_ZOOM_SPEED: f64 = 0.0025;

/// Per-event delta clamp for trackpads (pixels)
const WHEEL_TRACKPAD_CLAMP: f64 = 60.0;

/// Per-event delta clamp for mouse wheels (pixels)
const WHEEL_MOUSE_CLAMP: f64 = 120.0;

// ============================================================================
// DESIGN SPACE SETTINGS
// ============================================================================
/// Per-axis tolerance when matching an axis location to a master
const LOCATION_EPSILON: f64 = 0.001;

// ============================================================================
// COMPILE SETTINGS
// ============================================================================
/// Quiet period after the last edit before an automatic compile (ms)
const AUTO_COMPILE_DELAY_MS: u64 = 1000;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Camera limits and transition timing
pub mod camera {
    pub const MIN_SCALE: f64 = super::MIN_SCALE;
    pub const MAX_SCALE: f64 = super::MAX_SCALE;
    pub const ANIMATION_FRAMES: u32 = super::ANIMATION_FRAMES;
    pub const PAN_MARGIN: f64 = super::PAN_MARGIN;
}

/// Hit testing tolerances
pub mod hit {
    pub const RADIUS: f64 = super::HIT_RADIUS;
    pub const SINGULAR_DETERMINANT: f64 = super::SINGULAR_DETERMINANT;
    pub const MAX_COMPONENT_DEPTH: usize = super::MAX_COMPONENT_DEPTH;
}

/// Caret placement
pub mod text {
    pub const CLICK_MAX_DISTANCE: f64 = super::CLICK_MAX_DISTANCE;
}

/// Nudge amounts for arrow key movement
pub mod nudge {
    /// Base nudge (arrow key alone)
    pub const BASE: f64 = super::NUDGE_BASE;

    /// Shift-arrow nudge
    pub const SHIFT: f64 = super::NUDGE_SHIFT;

    /// Cmd-arrow nudge
    pub const CMD: f64 = super::NUDGE_CMD;
}

/// Wheel device classification and per-device speeds
pub mod wheel {
    pub const DEVICE_LOCK_MS: u64 = super::WHEEL_DEVICE_LOCK_MS;
    pub const MOUSE_TICK_THRESHOLD: f64 = super::WHEEL_MOUSE_TICK_THRESHOLD;
    pub const LINE_HEIGHT: f64 = super::WHEEL_LINE_HEIGHT;
    pub const TRACKPAD_PAN_SPEED: f64 = super::WHEEL_TRACKPAD_PAN_SPEED;
    pub const MOUSE_PAN_SPEED: f64 = super::WHEEL_MOUSE_PAN_SPEED;
    pub const TRACKPAD_ZOOM_SPEED: f64 = super::WHEEL_TRACKPAD_ZOOM_SPEED;
    pub const MOUSE_ZOOM_SPEED: f64 = super::WHEEL_MOUSE_ZOOM_SPEED;
    pub const TRACKPAD_CLAMP: f64 = super::WHEEL_TRACKPAD_CLAMP;
    pub const MOUSE_CLAMP: f64 = super::WHEEL_MOUSE_CLAMP;
}

/// Design space matching
pub mod designspace {
    pub const LOCATION_EPSILON: f64 = super::LOCATION_EPSILON;
}

/// Automatic compilation
pub mod compile {
    pub const AUTO_COMPILE_DELAY_MS: u64 = super::AUTO_COMPILE_DELAY_MS;
}

// ============================================================================
// RUNTIME SETTINGS
// ============================================================================

/// User-tunable settings, injected into the camera and editors.
///
/// Every field falls back to the constant above when missing from the
/// settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hit radius at scale 1.0 (font units)
    pub hit_radius: f64,
    /// Margin kept around the active glyph when panning (pixels)
    pub pan_margin: f64,
    /// Maximum click distance for caret placement (font units)
    pub click_max_distance: f64,
    pub trackpad_pan_speed: f64,
    pub mouse_pan_speed: f64,
    pub trackpad_zoom_speed: f64,
    pub mouse_zoom_speed: f64,
    /// Debounce before an automatic compile (milliseconds)
    pub auto_compile_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hit_radius: HIT_RADIUS,
            pan_margin: PAN_MARGIN,
            click_max_distance: CLICK_MAX_DISTANCE,
            trackpad_pan_speed: WHEEL_TRACKPAD_PAN_SPEED,
            mouse_pan_speed: WHEEL_MOUSE_PAN_SPEED,
            trackpad_zoom_speed: WHEEL_TRACKPAD_ZOOM_SPEED,
            mouse_zoom_speed: WHEEL_MOUSE_ZOOM_SPEED,
            auto_compile_delay_ms: AUTO_COMPILE_DELAY_MS,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(source)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&source)?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Replace out-of-range values with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.hit_radius.is_finite() && self.hit_radius > 0.0) {
            tracing::warn!("Ignoring invalid hit_radius {}", self.hit_radius);
            self.hit_radius = defaults.hit_radius;
        }
        if !(self.pan_margin.is_finite() && self.pan_margin >= 0.0) {
            tracing::warn!("Ignoring invalid pan_margin {}", self.pan_margin);
            self.pan_margin = defaults.pan_margin;
        }
        if !(self.click_max_distance.is_finite() && self.click_max_distance > 0.0) {
            self.click_max_distance = defaults.click_max_distance;
        }
        self
    }
}
