// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Viewport camera: pan, zoom, tweened transitions and wheel routing.

pub mod tween;
pub mod viewport;
pub mod wheel;

pub use tween::{CancelToken, Lerp, Scheduler, Tween};
pub use viewport::{CameraState, ViewportCamera};
pub use wheel::{WheelAction, WheelDelta, WheelDevice, WheelModifiers, WheelRouter};
