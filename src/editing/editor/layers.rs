// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Layer binding, interpolated previews, slider sessions and Escape

use super::{ComponentOutlineEditor, DragState, SliderSession};
use crate::camera::Tween;
use crate::error::{InterpolationError, ProviderError};
use crate::model::{AxisLocation, LayerKey, ResolvedLayer};
use crate::settings;

/// Identifies one interpolation request; only the newest one is honored
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterpolationTicket(u64);

/// What an Escape key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// Went back to the layer and location saved when a slider drag began
    RestoredPreDragState,
    /// Left the innermost component
    ExitedComponent,
    /// Left glyph editing altogether
    ExitedEditMode,
}

impl ComponentOutlineEditor {
    // ===== Layer binding =====

    /// Edit `layer_id` of `glyph` at `location`.
    ///
    /// Clears the component stack, the selection and any saved slider
    /// state. When `location` is not the layer's master location the
    /// master is shown first and then replaced by an interpolated preview.
    /// On a failed fetch nothing changes: the previous layer, location and
    /// slider state all stay in place.
    pub fn select_layer(&mut self, glyph: &str, layer_id: &str, location: AxisLocation) -> Result<(), ProviderError> {
        self.bind_layer(glyph, layer_id)?;
        self.slider = None;
        self.location = location;
        self.auto_select_matching_layer();
        Ok(())
    }

    /// Switch to another master layer of the current glyph, moving the
    /// axis location onto that master
    pub fn click_layer(&mut self, layer_id: &str) -> Result<(), ProviderError> {
        let Some(glyph) = self.glyph_name().map(str::to_string) else {
            return Err(ProviderError::LayerNotFound {
                glyph: String::new(),
                layer: layer_id.to_string(),
            });
        };
        let location = self.provider.master_location(layer_id).unwrap_or_else(|| self.location.clone());
        self.select_layer(&glyph, layer_id, location)
    }

    /// Leave glyph editing. The outline stays loaded for display.
    pub fn exit_edit_mode(&mut self) {
        while self.exit_component_editing() {}
        self.selection.clear();
        self.drag = DragState::default();
        self.edit_mode = false;
        tracing::info!("Exited glyph edit mode");
    }

    /// Fetch and show a master layer, resetting the editing context
    fn bind_layer(&mut self, glyph: &str, layer_id: &str) -> Result<(), ProviderError> {
        let resolved = self.provider.fetch_layer_data(glyph, layer_id).inspect_err(|err| {
            tracing::warn!("Failed to fetch layer '{}' of glyph '{}': {}", layer_id, glyph, err);
        })?;
        tracing::info!("Editing glyph '{}' layer '{}'", glyph, layer_id);

        self.root = Some(LayerKey::new(glyph, layer_id));
        self.show(resolved);
        self.edit_mode = true;
        self.pending_interpolation = None;
        Ok(())
    }

    fn show(&mut self, resolved: ResolvedLayer) {
        self.stack.clear();
        self.selection.clear();
        self.drag = DragState::default();
        self.layer = Some(resolved.layer);
        self.arena = resolved.arena;
    }

    /// Make the displayed data agree with the current axis location.
    ///
    /// Returns true when an editable master is shown. At the bound layer's
    /// master location the master is shown (re-fetched if a preview was
    /// displayed); at another master's location that master is bound;
    /// anywhere else an interpolated preview is requested.
    pub fn auto_select_matching_layer(&mut self) -> bool {
        let Some(root) = self.root.clone() else {
            return false;
        };

        let at_master = self
            .provider
            .master_location(&root.layer)
            .is_none_or(|master| master.matches(&self.location));
        if at_master {
            self.pending_interpolation = None;
            if self.is_interpolated() {
                return self.bind_layer(&root.glyph, &root.layer).is_ok();
            }
            return true;
        }

        if let Some(layer_id) = self.provider.layer_for_location(&self.location)
            && layer_id != root.layer
        {
            return self.bind_layer(&root.glyph, &layer_id).is_ok();
        }

        self.request_interpolation();
        false
    }

    /// Set the axis location and update the displayed layer
    pub fn set_location(&mut self, location: AxisLocation) -> bool {
        self.location = location;
        self.auto_select_matching_layer()
    }

    // ===== Interpolated previews =====

    /// Ask the injected interpolator for a preview at the current location
    pub fn request_interpolation(&mut self) -> bool {
        let Some(interpolator) = self.interpolator.clone() else {
            tracing::warn!("No interpolator available, keeping master outline");
            return false;
        };
        let Some(ticket) = self.begin_interpolation() else {
            return false;
        };
        let Some(glyph) = self.glyph_name().map(str::to_string) else {
            return false;
        };
        let result = interpolator.interpolate_glyph(&glyph, &self.location);
        self.receive_interpolation(ticket, result)
    }

    /// Start a preview request, superseding any request still in flight.
    ///
    /// Hosts that interpolate off-thread pass the returned ticket back to
    /// [`Self::receive_interpolation`] with the result.
    pub fn begin_interpolation(&mut self) -> Option<InterpolationTicket> {
        self.root.as_ref()?;
        self.next_ticket += 1;
        let ticket = InterpolationTicket(self.next_ticket);
        if let Some(previous) = self.pending_interpolation.replace(ticket) {
            tracing::debug!("Interpolation request {:?} superseded by {:?}", previous, ticket);
        }
        Some(ticket)
    }

    /// Deliver the result of an interpolation request.
    ///
    /// Results for superseded tickets and cancellations are dropped
    /// silently. Other failures keep the current display. Returns true if
    /// the preview was shown.
    pub fn receive_interpolation(
        &mut self,
        ticket: InterpolationTicket,
        result: Result<ResolvedLayer, InterpolationError>,
    ) -> bool {
        if self.pending_interpolation != Some(ticket) {
            tracing::debug!("Dropping stale interpolation result {:?}", ticket);
            return false;
        }
        self.pending_interpolation = None;

        match result {
            Ok(mut resolved) => {
                resolved.layer.is_interpolated = true;
                self.show(resolved);
                true
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!("Interpolation request {:?} was cancelled", ticket);
                false
            }
            Err(err) => {
                tracing::warn!("Interpolation failed, keeping previous outline: {}", err);
                false
            }
        }
    }

    pub fn has_pending_interpolation(&self) -> bool {
        self.pending_interpolation.is_some()
    }

    // ===== Axis sliders =====

    /// Remember the current layer and location so Escape can return to
    /// them. A session already in progress is kept.
    pub fn begin_slider_session(&mut self) {
        if self.slider.is_none() {
            self.slider = Some(SliderSession {
                layer_id: self.layer_id().map(str::to_string),
                location: self.location.clone(),
            });
        }
    }

    /// Whether a slider session's pre-drag state is still saved
    pub fn has_saved_slider_state(&self) -> bool {
        self.slider.is_some()
    }

    /// Move one axis during a slider drag
    pub fn slider_moved(&mut self, axis: &str, value: f64) -> bool {
        self.begin_slider_session();
        self.location.set(axis, value);
        self.auto_select_matching_layer()
    }

    /// Tween `axis` to `value` over the standard animation length
    pub fn animate_axis(&mut self, axis: &str, value: f64) {
        let start = self.location.get(axis).unwrap_or(value);
        self.axis_tweens
            .start(axis.to_string(), Tween::new(start, value, settings::camera::ANIMATION_FRAMES));
    }

    pub fn is_animating_axes(&self) -> bool {
        !self.axis_tweens.is_idle()
    }

    /// Advance running axis tweens one frame. Returns true while any remain.
    pub fn tick_axis_animation(&mut self) -> bool {
        let mut frame = Vec::new();
        let remaining = self.axis_tweens.tick(|axis, value| frame.push((axis.clone(), value)));
        if frame.is_empty() {
            return false;
        }
        for (axis, value) in frame {
            self.location.set(axis, value);
        }
        self.auto_select_matching_layer();
        remaining > 0
    }

    // ===== Escape =====

    /// Resolve an Escape key press.
    ///
    /// In order: restore the state saved by a slider drag if it differs
    /// from what is shown, else leave one component level, else leave edit
    /// mode.
    pub fn escape(&mut self) -> EscapeOutcome {
        if let Some(saved) = self.slider.take() {
            let differs = saved.layer_id.as_deref() != self.layer_id() || !saved.location.matches(&self.location);
            if differs {
                self.restore(saved);
                return EscapeOutcome::RestoredPreDragState;
            }
        }

        if self.exit_component_editing() {
            return EscapeOutcome::ExitedComponent;
        }

        self.exit_edit_mode();
        EscapeOutcome::ExitedEditMode
    }

    fn restore(&mut self, saved: SliderSession) {
        tracing::info!("Restoring pre-drag layer {:?}", saved.layer_id);
        self.axis_tweens = Default::default();
        self.location = saved.location;
        if let (Some(layer_id), Some(glyph)) = (saved.layer_id, self.glyph_name().map(str::to_string))
            && self.layer_id() != Some(layer_id.as_str())
        {
            // Failure is already logged and leaves the current layer bound
            let _ = self.bind_layer(&glyph, &layer_id);
        }
        self.auto_select_matching_layer();
    }
}
