// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing core for a variable-font glyph editor.
//!
//! Three pieces cooperate here:
//!
//! - [`camera::ViewportCamera`] maps font units to screen pixels and runs
//!   tweened pan/zoom transitions.
//! - [`text::TextShaper`] owns the text under edit, shapes it per bidi run
//!   and resolves logical cursor positions against the visual glyph order.
//! - [`editing::ComponentOutlineEditor`] owns the outline of the active glyph
//!   and lets the user descend into nested components and drag their points.
//!
//! Shaping, bidi analysis, font storage, interpolation and compilation are
//! reached through the traits in [`host`]; everything is injected through
//! constructors.

pub mod camera;
pub mod compile;
pub mod editing;
pub mod error;
pub mod host;
pub mod logging;
pub mod model;
pub mod settings;
pub mod shaping;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use camera::ViewportCamera;
pub use editing::ComponentOutlineEditor;
pub use model::{LayerData, LayerKey, Shape};
pub use settings::Settings;
pub use text::TextShaper;
