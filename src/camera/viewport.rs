// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Font-unit <-> screen-pixel camera.
//!
//! The mapping is a uniform scale with a Y flip, since font space is Y-up
//! and screen space is Y-down:
//!
//! ```text
//! screen.x =  design.x * scale + pan.x
//! screen.y = -design.y * scale + pan.y
//! ```

use super::tween::{Lerp, Scheduler, Tween};
use super::wheel::{WheelAction, WheelDelta, WheelModifiers, WheelRouter};
use crate::settings::{self, Settings};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use std::time::Instant;

/// Scale and pan of the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub scale: f64,
    pub pan: Vec2,
}

impl Lerp for CameraState {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            scale: Lerp::lerp(&self.scale, &other.scale, t),
            pan: self.pan.lerp(other.pan, t),
        }
    }
}

fn scale_in_range(scale: f64) -> bool {
    scale.is_finite() && (settings::camera::MIN_SCALE..=settings::camera::MAX_SCALE).contains(&scale)
}

/// Animation targets of the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CameraTarget {
    View,
}

pub struct ViewportCamera {
    state: CameraState,
    viewport: Size,
    margin: f64,
    animations: Scheduler<CameraTarget, CameraState>,
    wheel: WheelRouter,
    /// Vertical design-space range kept in view across glyph navigation
    glyph_window: Option<(f64, f64)>,
}

impl ViewportCamera {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: CameraState {
                scale: 1.0,
                pan: Vec2::ZERO,
            },
            viewport: Size::ZERO,
            margin: settings.pan_margin,
            animations: Scheduler::new(),
            wheel: WheelRouter::new(settings),
            glyph_window: None,
        }
    }

    // ===== State =====

    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn pan(&self) -> Vec2 {
        self.state.pan
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Jump to a state without animating. Out-of-range scales are rejected.
    pub fn set_state(&mut self, state: CameraState) -> bool {
        if !scale_in_range(state.scale) {
            return false;
        }
        self.animations.cancel(&CameraTarget::View);
        self.state = state;
        true
    }

    /// Design -> screen transform
    pub fn affine(&self) -> Affine {
        let CameraState { scale, pan } = self.state;
        Affine::new([scale, 0.0, 0.0, -scale, pan.x, pan.y])
    }

    pub fn to_screen(&self, design: Point) -> Point {
        Point::new(
            design.x * self.state.scale + self.state.pan.x,
            -design.y * self.state.scale + self.state.pan.y,
        )
    }

    pub fn to_design(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.state.pan.x) / self.state.scale,
            -(screen.y - self.state.pan.y) / self.state.scale,
        )
    }

    // ===== Direct manipulation =====

    /// Zoom by `factor` keeping `pivot` (screen) fixed.
    ///
    /// Returns false, leaving the camera untouched, if the new scale would
    /// leave the allowed range.
    pub fn zoom(&mut self, factor: f64, pivot: Point) -> bool {
        let scale = self.state.scale * factor;
        if !scale_in_range(scale) {
            tracing::debug!("Rejecting zoom to scale {}", scale);
            return false;
        }
        self.animations.cancel(&CameraTarget::View);

        let design = self.to_design(pivot);
        self.state = CameraState {
            scale,
            pan: Vec2::new(pivot.x - design.x * scale, pivot.y + design.y * scale),
        };
        true
    }

    /// Move the view by a screen-space offset
    pub fn pan_by(&mut self, delta: Vec2) {
        self.animations.cancel(&CameraTarget::View);
        self.state.pan += delta;
    }

    /// Route a wheel event to zoom or pan
    pub fn wheel(&mut self, delta: WheelDelta, modifiers: WheelModifiers, pointer: Point, now: Instant) -> bool {
        match self.wheel.route(delta, modifiers, pointer, now) {
            WheelAction::Zoom { factor, pivot } => self.zoom(factor, pivot),
            WheelAction::Pan(delta) => {
                self.pan_by(delta);
                true
            }
        }
    }

    // ===== Animation =====

    pub fn is_animating(&self) -> bool {
        self.animations.is_running(&CameraTarget::View)
    }

    /// Start a transition to `target`, replacing any running one
    pub fn animate_to(&mut self, target: CameraState) -> bool {
        if !scale_in_range(target.scale) {
            tracing::debug!("Rejecting animation to scale {}", target.scale);
            return false;
        }
        self.animations
            .start(CameraTarget::View, Tween::new(self.state, target, settings::camera::ANIMATION_FRAMES));
        true
    }

    /// Advance the running transition one frame and render it.
    ///
    /// Returns true while frames remain.
    pub fn tick_animation<F>(&mut self, render: F) -> bool
    where
        F: FnOnce(&Self),
    {
        let mut next = None;
        let remaining = self.animations.tick(|_, state| next = Some(state));
        let Some(state) = next else {
            return false;
        };
        self.state = state;
        render(self);
        remaining > 0
    }

    /// Drive the running transition to completion, rendering every frame
    pub fn run_animation<F>(&mut self, mut render: F)
    where
        F: FnMut(&Self),
    {
        while self.tick_animation(&mut render) {}
    }

    // ===== Framing =====

    /// Camera state showing `bounds` centered with the margin around it
    pub fn state_for_bounds(&self, bounds: Rect) -> Option<CameraState> {
        let available = Size::new(
            self.viewport.width - 2.0 * self.margin,
            self.viewport.height - 2.0 * self.margin,
        );
        if available.width <= 0.0 || available.height <= 0.0 || bounds.area() <= 0.0 {
            return None;
        }

        let scale = (available.width / bounds.width())
            .min(available.height / bounds.height())
            .clamp(settings::camera::MIN_SCALE, settings::camera::MAX_SCALE);
        let center = bounds.center();
        Some(CameraState {
            scale,
            pan: Vec2::new(
                self.viewport.width / 2.0 - center.x * scale,
                self.viewport.height / 2.0 + center.y * scale,
            ),
        })
    }

    /// Animate so `bounds` fills the viewport
    pub fn frame_bounds(&mut self, bounds: Rect) -> bool {
        match self.state_for_bounds(bounds) {
            Some(target) => self.animate_to(target),
            None => false,
        }
    }

    /// Forget the vertical window accumulated by [`Self::pan_to_glyph`]
    pub fn reset_glyph_window(&mut self) {
        self.glyph_window = None;
    }

    /// Bring a glyph into view after the active glyph changed.
    ///
    /// Vertically, a window spanning every glyph visited so far is kept in
    /// view; the camera only moves vertically when that window no longer
    /// fits or the glyph is outside the margin-inset viewport. Horizontally
    /// it moves only when the glyph leaves the margin-inset viewport.
    /// Returns true when a transition was started.
    pub fn pan_to_glyph(&mut self, bounds: Rect) -> bool {
        let scale = self.state.scale;
        let inner_height = self.viewport.height - 2.0 * self.margin;
        let inner_width = self.viewport.width - 2.0 * self.margin;
        if inner_width <= 0.0 || inner_height <= 0.0 {
            return false;
        }

        let window = match self.glyph_window {
            Some((low, high)) => (low.min(bounds.min_y()), high.max(bounds.max_y())),
            None => (bounds.min_y(), bounds.max_y()),
        };
        let window = if (window.1 - window.0) * scale > inner_height {
            (bounds.min_y(), bounds.max_y())
        } else {
            window
        };
        self.glyph_window = Some(window);

        let mut target = self.state;

        // Visible design-space range, inset by the margin
        let top = self.to_design(Point::new(0.0, self.margin)).y;
        let bottom = self.to_design(Point::new(0.0, self.viewport.height - self.margin)).y;
        if bounds.min_y() < bottom || bounds.max_y() > top {
            let center = (window.0 + window.1) / 2.0;
            target.pan.y = self.viewport.height / 2.0 + center * scale;
        }

        let left = self.to_design(Point::new(self.margin, 0.0)).x;
        let right = self.to_design(Point::new(self.viewport.width - self.margin, 0.0)).x;
        if bounds.min_x() < left || bounds.width() * scale > inner_width {
            target.pan.x = self.margin - bounds.min_x() * scale;
        } else if bounds.max_x() > right {
            target.pan.x = self.viewport.width - self.margin - bounds.max_x() * scale;
        }

        if target == self.state {
            return false;
        }
        self.animate_to(target)
    }
}

impl std::fmt::Debug for ViewportCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportCamera")
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("glyph_window", &self.glyph_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ViewportCamera {
        let mut camera = ViewportCamera::new(&Settings::default());
        camera.set_viewport_size(Size::new(1000.0, 800.0));
        camera
    }

    #[test]
    fn zoom_keeps_pivot_fixed() {
        let mut camera = camera();
        assert!(camera.zoom(2.0, Point::new(100.0, 100.0)));
        assert_eq!(camera.scale(), 2.0);
        assert_eq!(camera.pan(), Vec2::new(-100.0, -100.0));
    }

    #[test]
    fn zoom_out_of_range_is_rejected() {
        let mut camera = camera();
        assert!(!camera.zoom(200.0, Point::ZERO));
        assert!(!camera.zoom(0.001, Point::ZERO));
        assert_eq!(camera.scale(), 1.0);
    }

    #[test]
    fn screen_design_round_trip() {
        let mut camera = camera();
        camera.zoom(1.5, Point::new(300.0, 200.0));
        camera.pan_by(Vec2::new(12.0, -7.0));
        let design = Point::new(123.0, -45.0);
        let back = camera.to_design(camera.to_screen(design));
        assert!((back - design).hypot() < 1e-9);
        assert_eq!(camera.affine() * design, camera.to_screen(design));
    }

    #[test]
    fn y_axis_is_flipped() {
        let camera = camera();
        assert_eq!(camera.to_screen(Point::new(0.0, 100.0)), Point::new(0.0, -100.0));
    }

    #[test]
    fn animation_runs_ten_frames_and_snaps() {
        let mut camera = camera();
        let target = CameraState {
            scale: 0.37,
            pan: Vec2::new(123.4, 567.8),
        };
        assert!(camera.animate_to(target));

        let mut frames = 0;
        camera.run_animation(|_| frames += 1);
        assert_eq!(frames, 10);
        assert_eq!(camera.state(), target);
        assert!(!camera.is_animating());
    }

    #[test]
    fn newer_animation_wins() {
        let mut camera = camera();
        camera.animate_to(CameraState { scale: 2.0, pan: Vec2::ZERO });
        camera.tick_animation(|_| {});
        let last = CameraState { scale: 0.5, pan: Vec2::new(10.0, 10.0) };
        camera.animate_to(last);
        camera.run_animation(|_| {});
        assert_eq!(camera.state(), last);
    }

    #[test]
    fn user_zoom_cancels_animation() {
        let mut camera = camera();
        camera.animate_to(CameraState { scale: 3.0, pan: Vec2::ZERO });
        camera.zoom(1.1, Point::ZERO);
        assert!(!camera.is_animating());
        assert!(!camera.tick_animation(|_| panic!("no frame expected")));
    }

    #[test]
    fn frame_bounds_centers_glyph() {
        let mut camera = camera();
        let bounds = Rect::new(0.0, -200.0, 500.0, 800.0);
        assert!(camera.frame_bounds(bounds));
        camera.run_animation(|_| {});

        let center = camera.to_screen(bounds.center());
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 400.0).abs() < 1e-9);
        // 1000 units tall into 800 - 2 * 60 pixels
        assert!((camera.scale() - 0.68).abs() < 1e-9);
    }

    #[test]
    fn pan_to_visible_glyph_does_nothing() {
        let mut camera = camera();
        camera.set_state(CameraState { scale: 0.5, pan: Vec2::new(100.0, 500.0) });
        // Inset visible range: x -80..1680, y -480..880
        assert!(!camera.pan_to_glyph(Rect::new(100.0, -100.0, 600.0, 700.0)));
    }

    #[test]
    fn pan_to_glyph_off_right_edge_moves_horizontally_only() {
        let mut camera = camera();
        camera.set_state(CameraState { scale: 0.5, pan: Vec2::new(100.0, 500.0) });
        let bounds = Rect::new(1500.0, -100.0, 2000.0, 700.0);
        assert!(camera.pan_to_glyph(bounds));
        camera.run_animation(|_| {});

        assert_eq!(camera.pan().y, 500.0);
        let right_edge = camera.to_screen(Point::new(2000.0, 0.0)).x;
        assert!((right_edge - 940.0).abs() < 1e-9);
    }

    #[test]
    fn tall_glyph_recenters_vertically() {
        let mut camera = camera();
        camera.set_state(CameraState { scale: 0.5, pan: Vec2::new(100.0, 500.0) });
        let bounds = Rect::new(100.0, -100.0, 600.0, 1200.0);
        assert!(camera.pan_to_glyph(bounds));
        camera.run_animation(|_| {});

        let center = camera.to_screen(Point::new(0.0, 550.0));
        assert!((center.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn vertical_window_accumulates_then_resets() {
        let mut camera = camera();
        camera.set_state(CameraState { scale: 0.5, pan: Vec2::new(100.0, 500.0) });
        camera.pan_to_glyph(Rect::new(100.0, 0.0, 500.0, 500.0));
        camera.pan_to_glyph(Rect::new(100.0, -200.0, 500.0, 300.0));
        assert_eq!(camera.glyph_window, Some((-200.0, 500.0)));

        camera.reset_glyph_window();
        camera.pan_to_glyph(Rect::new(100.0, 0.0, 500.0, 100.0));
        assert_eq!(camera.glyph_window, Some((0.0, 100.0)));
    }

    #[test]
    fn wheel_zoom_and_pan() {
        let mut camera = camera();
        let now = Instant::now();
        assert!(camera.wheel(
            WheelDelta::Pixels(Vec2::new(3.0, 4.0)),
            WheelModifiers::default(),
            Point::ZERO,
            now,
        ));
        assert_eq!(camera.pan(), Vec2::new(-3.0, -4.0));

        let zoom = WheelModifiers { zoom: true, shift: false };
        assert!(camera.wheel(WheelDelta::Pixels(Vec2::new(0.0, -20.0)), zoom, Point::ZERO, now));
        assert!(camera.scale() > 1.0);
    }
}
