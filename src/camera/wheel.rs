// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Wheel input: device classification and routing to zoom or pan.
//!
//! Trackpads send a stream of small, often two-dimensional pixel deltas.
//! Mouse wheels send line deltas or large vertical-only pixel steps. Once a
//! device is recognized it stays locked for a short window so a gesture is
//! not reclassified halfway through.

use crate::settings::{self, Settings};
use kurbo::{Point, Vec2};
use std::time::{Duration, Instant};

/// Raw wheel delta as delivered by the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    Pixels(Vec2),
    Lines(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDevice {
    Trackpad,
    Mouse,
}

/// Modifier keys held during a wheel event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelModifiers {
    /// Ctrl or Cmd: zoom
    pub zoom: bool,
    /// Shift: horizontal pan with a mouse wheel
    pub shift: bool,
}

/// What a wheel event should do to the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelAction {
    Zoom { factor: f64, pivot: Point },
    /// Screen-space pan offset to add
    Pan(Vec2),
}

#[derive(Debug, Clone)]
pub struct WheelRouter {
    locked: Option<(WheelDevice, Instant)>,
    lock_window: Duration,
    trackpad_pan_speed: f64,
    mouse_pan_speed: f64,
    trackpad_zoom_speed: f64,
    mouse_zoom_speed: f64,
}

impl WheelRouter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            locked: None,
            lock_window: Duration::from_millis(settings::wheel::DEVICE_LOCK_MS),
            trackpad_pan_speed: settings.trackpad_pan_speed,
            mouse_pan_speed: settings.mouse_pan_speed,
            trackpad_zoom_speed: settings.trackpad_zoom_speed,
            mouse_zoom_speed: settings.mouse_zoom_speed,
        }
    }

    /// Device that produced `delta`, honoring the lock window
    pub fn classify(&mut self, delta: WheelDelta, now: Instant) -> WheelDevice {
        if let Some((device, since)) = self.locked
            && now.saturating_duration_since(since) < self.lock_window
        {
            self.locked = Some((device, now));
            return device;
        }

        let device = match delta {
            WheelDelta::Lines(_) => WheelDevice::Mouse,
            WheelDelta::Pixels(d)
                if d.x == 0.0 && d.y.abs() >= settings::wheel::MOUSE_TICK_THRESHOLD =>
            {
                WheelDevice::Mouse
            }
            WheelDelta::Pixels(_) => WheelDevice::Trackpad,
        };
        tracing::trace!("Wheel device classified as {:?}", device);
        self.locked = Some((device, now));
        device
    }

    /// Turn a wheel event into a camera action
    pub fn route(&mut self, delta: WheelDelta, modifiers: WheelModifiers, pointer: Point, now: Instant) -> WheelAction {
        let device = self.classify(delta, now);

        let pixels = match delta {
            WheelDelta::Pixels(d) => d,
            WheelDelta::Lines(d) => d * settings::wheel::LINE_HEIGHT,
        };
        let clamp = match device {
            WheelDevice::Trackpad => settings::wheel::TRACKPAD_CLAMP,
            WheelDevice::Mouse => settings::wheel::MOUSE_CLAMP,
        };
        let pixels = Vec2::new(pixels.x.clamp(-clamp, clamp), pixels.y.clamp(-clamp, clamp));

        if modifiers.zoom {
            let speed = match device {
                WheelDevice::Trackpad => self.trackpad_zoom_speed,
                WheelDevice::Mouse => self.mouse_zoom_speed,
            };
            // Scrolling down (positive y) zooms out
            return WheelAction::Zoom {
                factor: (-pixels.y * speed).exp(),
                pivot: pointer,
            };
        }

        match device {
            WheelDevice::Mouse if modifiers.shift => {
                WheelAction::Pan(Vec2::new(-pixels.y * self.mouse_pan_speed, 0.0))
            }
            WheelDevice::Mouse => WheelAction::Pan(-pixels * self.mouse_pan_speed),
            WheelDevice::Trackpad => WheelAction::Pan(-pixels * self.trackpad_pan_speed),
        }
    }
}
