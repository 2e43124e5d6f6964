// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup for hosts that embed the editing core.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` does not mention this crate
const DEFAULT_DIRECTIVE: &str = "fonteditor_core=info";

/// Install a formatting subscriber driven by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored because a global
/// subscriber is already set.
pub fn init() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = DEFAULT_DIRECTIVE.parse() {
        filter = filter.add_directive(directive);
    }

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
