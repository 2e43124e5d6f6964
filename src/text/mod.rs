// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Text shaping, bidi layout and cursor resolution.
//!
//! # Architecture
//!
//! - **TextBuffer** (`buffer`): the logical characters, the cursor and the
//!   selection anchor.
//!
//! - **ShapedText** (`cluster`): glyphs in visual order plus the cluster map
//!   linking them back to logical character ranges.
//!
//! - **caret** / **navigation**: pure functions over a `ShapedText` for
//!   caret x positions, click hit-testing, glyph classification and
//!   glyph-by-glyph movement.
//!
//! - **TextShaper** (`shaper`): ties the above to the injected shaping and
//!   bidi capabilities, reshaping after every change.

pub mod buffer;
pub mod caret;
pub mod cluster;
pub mod navigation;
pub mod shaper;

pub use buffer::TextBuffer;
pub use caret::{GlyphOrigin, LineMetrics};
pub use cluster::{ClusterMapEntry, ShapedText};
pub use navigation::Travel;
pub use shaper::{TextShaper, shape_text};
