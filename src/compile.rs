// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Automatic recompilation of the font after edits.
//!
//! Every successful layer save marks the font dirty. Once a quiet window
//! (one second by default) has passed since the last edit, the next
//! [`AutoCompiler::poll`] serializes the font and hands it to the injected
//! compiler. The resulting bytes feed the text shaper. A failed compile is
//! logged and the previous bytes stay in use.
//!
//! Time is passed in by the caller, so the debounce is testable without a
//! real clock.

use crate::error::CompileError;
use crate::host::CompilationCapability;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Options forwarded to the font compiler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Skip creation of kern tables
    pub skip_kerning: bool,
    /// Skip OpenType feature compilation
    pub skip_features: bool,
    pub skip_metrics: bool,
    /// Skip `glyf`/`gvar` table creation
    pub skip_outlines: bool,
    pub dont_use_production_names: bool,
    /// Only these glyphs are compiled; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subset_glyphs: Vec<String>,
}

impl CompileOptions {
    /// Options for a quick preview build of a few glyphs
    pub fn preview(glyphs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            skip_kerning: true,
            skip_metrics: true,
            dont_use_production_names: true,
            subset_glyphs: glyphs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// JSON form, as compiler backends accept it
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Debounced compiler driver
pub struct AutoCompiler {
    compiler: Rc<dyn CompilationCapability>,
    options: CompileOptions,
    delay: Duration,
    /// Time of the most recent unsaved-to-binary edit
    dirty_since: Option<Instant>,
    last_revision: u64,
    font_bytes: Option<Arc<Vec<u8>>>,
}

impl AutoCompiler {
    pub fn new(compiler: Rc<dyn CompilationCapability>, options: CompileOptions, settings: &Settings) -> Self {
        Self {
            compiler,
            options,
            delay: Duration::from_millis(settings.auto_compile_delay_ms),
            dirty_since: None,
            last_revision: 0,
            font_bytes: None,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: CompileOptions) {
        self.options = options;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Last successfully compiled font
    pub fn font_bytes(&self) -> Option<Arc<Vec<u8>>> {
        self.font_bytes.clone()
    }

    /// Record an edit; restarts the quiet window
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_since = Some(now);
    }

    /// Mark dirty when the editor's revision counter moved
    pub fn observe_revision(&mut self, revision: u64, now: Instant) {
        if revision != self.last_revision {
            self.last_revision = revision;
            self.mark_dirty(now);
        }
    }

    /// Compile if dirty and quiet for long enough.
    ///
    /// Returns the new font bytes when a compile succeeded.
    pub fn poll<F>(&mut self, now: Instant, describe: F) -> Option<Arc<Vec<u8>>>
    where
        F: FnOnce() -> Result<String, CompileError>,
    {
        let since = self.dirty_since?;
        if now.saturating_duration_since(since) < self.delay {
            return None;
        }
        self.dirty_since = None;
        self.compile_now(describe)
    }

    /// Compile immediately, regardless of the dirty state
    pub fn compile_now<F>(&mut self, describe: F) -> Option<Arc<Vec<u8>>>
    where
        F: FnOnce() -> Result<String, CompileError>,
    {
        let started = Instant::now();
        let result = describe().and_then(|description| self.compiler.compile(&description, &self.options));

        match result {
            Ok(bytes) => {
                tracing::info!(
                    "Compiled font ({} bytes) in {:.2}s",
                    bytes.len(),
                    started.elapsed().as_secs_f64()
                );
                let bytes = Arc::new(bytes);
                self.font_bytes = Some(Arc::clone(&bytes));
                Some(bytes)
            }
            Err(err) => {
                tracing::error!("Auto-compile failed, keeping previous font: {}", err);
                None
            }
        }
    }
}

impl std::fmt::Debug for AutoCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCompiler")
            .field("options", &self.options)
            .field("delay", &self.delay)
            .field("dirty_since", &self.dirty_since)
            .field("last_revision", &self.last_revision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubCompiler;

    fn compiler() -> (Rc<StubCompiler>, AutoCompiler) {
        let stub = Rc::new(StubCompiler::default());
        let auto = AutoCompiler::new(stub.clone(), CompileOptions::default(), &Settings::default());
        (stub, auto)
    }

    fn describe() -> Result<String, CompileError> {
        Ok("font".to_string())
    }

    #[test]
    fn waits_for_quiet_window() {
        let (stub, mut auto) = compiler();
        let t0 = Instant::now();
        auto.mark_dirty(t0);

        assert!(auto.poll(t0 + Duration::from_millis(500), describe).is_none());
        assert_eq!(stub.calls.get(), 0);

        let bytes = auto.poll(t0 + Duration::from_millis(1000), describe).unwrap();
        assert_eq!(bytes.as_slice(), b"font");
        assert!(!auto.is_dirty());
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn new_edit_restarts_window() {
        let (stub, mut auto) = compiler();
        let t0 = Instant::now();
        auto.mark_dirty(t0);
        auto.mark_dirty(t0 + Duration::from_millis(800));

        assert!(auto.poll(t0 + Duration::from_millis(1200), describe).is_none());
        assert!(auto.poll(t0 + Duration::from_millis(1800), describe).is_some());
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn clean_font_is_not_compiled() {
        let (stub, mut auto) = compiler();
        assert!(auto.poll(Instant::now() + Duration::from_secs(5), describe).is_none());
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn failure_keeps_previous_bytes() {
        let (stub, mut auto) = compiler();
        let t0 = Instant::now();
        auto.mark_dirty(t0);
        auto.poll(t0 + Duration::from_secs(1), describe);

        stub.fail.set(true);
        auto.mark_dirty(t0 + Duration::from_secs(2));
        assert!(auto.poll(t0 + Duration::from_secs(3), describe).is_none());
        assert_eq!(auto.font_bytes().unwrap().as_slice(), b"font");
    }

    #[test]
    fn description_failure_is_not_compiled() {
        let (stub, mut auto) = compiler();
        let result = auto.compile_now(|| Err(CompileError::Description("bad glyph".to_string())));
        assert!(result.is_none());
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn revision_changes_mark_dirty() {
        let (_, mut auto) = compiler();
        let t0 = Instant::now();
        auto.observe_revision(0, t0);
        assert!(!auto.is_dirty());
        auto.observe_revision(3, t0);
        assert!(auto.is_dirty());
    }

    #[test]
    fn options_serialize_like_compiler_arguments() {
        let json = CompileOptions::preview(["a", "b"]).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["skip_kerning"], true);
        assert_eq!(value["skip_outlines"], false);
        assert_eq!(value["subset_glyphs"], serde_json::json!(["a", "b"]));

        let default_json = CompileOptions::default().to_json().unwrap();
        assert!(!default_json.contains("subset_glyphs"));
    }
}
