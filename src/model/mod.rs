// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Font data model

pub mod arena;
pub mod designspace;
pub mod interpolate;
pub mod layer;
pub mod location;
pub mod workspace;

pub use arena::{LayerArena, ResolvedLayer};
pub use designspace::{DesignAxis, DesignspaceProject, Master};
pub use interpolate::MasterInterpolator;
pub use layer::{Anchor, LayerData, LayerKey, Node, PointRef, PointType, Shape};
pub use location::AxisLocation;
pub use workspace::{Glyph, Workspace, read_workspace, write_workspace};
