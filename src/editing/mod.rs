// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Outline editing: selection, nested component contexts and hit testing

pub mod editor;
pub mod selection;
pub mod stack;

pub use editor::{ComponentOutlineEditor, EscapeOutcome, InterpolationTicket};
pub use hit_test::HitTarget;
pub use selection::{OutlineSelection, SelectedItem, Selection};
pub use stack::{ComponentFrame, ComponentStack};
