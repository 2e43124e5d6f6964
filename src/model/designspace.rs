// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Designspace project management for variable font editing
//!
//! A designspace file ties multiple UFO masters together. Each master is
//! one layer of the editor: its layer id is the master name, and its
//! location places it in design space. The project is the storage behind
//! [`FontDataProvider`]: fetched layers come back with every component
//! resolved through a [`LayerArena`], and saved layers go straight into the
//! master's in-memory workspace.

use anyhow::{Context, Result};
use norad::designspace::{DesignSpaceDocument, Source as NoradSource};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::arena::{LayerArena, ResolvedLayer};
use super::layer::{LayerData, LayerKey};
use super::location::AxisLocation;
use super::workspace::{Workspace, read_workspace, write_workspace};
use crate::error::ProviderError;
use crate::host::FontDataProvider;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A set of font masters placed in design space
#[derive(Debug)]
pub struct DesignspaceProject {
    /// Path to the .designspace file, if loaded from one
    pub path: Option<PathBuf>,

    /// Design axes (wght, wdth, etc.)
    pub axes: Vec<DesignAxis>,

    /// Font masters (one workspace per source)
    pub masters: Vec<Master>,

    /// Index of the currently active master
    pub active_master: usize,

    /// Original designspace document (for round-tripping)
    designspace_doc: Option<DesignSpaceDocument>,
}

/// A design axis (e.g., Weight, Width)
#[derive(Debug, Clone, PartialEq)]
pub struct DesignAxis {
    /// Axis tag (e.g., "wght", "wdth")
    pub tag: String,
    /// Human-readable name (e.g., "Weight"); locations are keyed by it
    pub name: String,
    pub minimum: f64,
    pub maximum: f64,
    pub default: f64,
}

/// A font master (source in designspace terms)
#[derive(Debug)]
pub struct Master {
    /// Master name, also used as its layer id
    pub name: String,

    /// Style name (e.g., "Regular", "Bold")
    pub style_name: String,

    /// Location in design space (axis name -> value)
    pub location: AxisLocation,

    /// The loaded workspace (wrapped for shared access)
    pub workspace: Arc<RwLock<Workspace>>,

    /// Path to the UFO file
    pub ufo_path: PathBuf,
}

impl Master {
    /// A master wrapping an already loaded workspace
    pub fn new(name: &str, location: AxisLocation, workspace: Workspace) -> Self {
        Self {
            name: name.to_string(),
            style_name: workspace.style_name.clone(),
            location,
            ufo_path: workspace.path.clone(),
            workspace: Arc::new(RwLock::new(workspace)),
        }
    }
}

// ============================================================================
// IMPLEMENTATION
// ============================================================================

impl DesignspaceProject {
    /// Load a designspace project from a .designspace file
    ///
    /// This parses the designspace XML and loads all referenced UFO sources.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading designspace: {}", path.display());

        let designspace_doc = DesignSpaceDocument::load(path)
            .with_context(|| format!("Failed to parse designspace: {}", path.display()))?;

        // Sources are relative to the designspace file
        let base_dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Invalid designspace path"))?;

        let axes = Self::parse_axes(&designspace_doc);
        tracing::debug!("Found {} axes", axes.len());

        let masters = designspace_doc
            .sources
            .iter()
            .map(|source| Self::load_master(source, base_dir))
            .collect::<Result<Vec<_>>>()?;
        if masters.is_empty() {
            anyhow::bail!("Designspace has no sources");
        }
        tracing::info!("Loaded {} masters", masters.len());

        let mut project = Self::from_masters(axes, masters);
        project.path = Some(path.to_path_buf());
        project.designspace_doc = Some(designspace_doc);
        Ok(project)
    }

    /// A single-master project for a plain UFO
    pub fn from_workspace(workspace: Workspace) -> Self {
        let name = workspace.style_name.clone();
        Self::from_masters(Vec::new(), vec![Master::new(&name, AxisLocation::new(), workspace)])
    }

    /// A project built from in-memory masters
    pub fn from_masters(axes: Vec<DesignAxis>, masters: Vec<Master>) -> Self {
        let active_master = Self::find_default_master(&axes, &masters);
        if let Some(master) = masters.get(active_master) {
            tracing::info!("Default master: {} ({})", master.name, master.style_name);
        }
        Self {
            path: None,
            axes,
            masters,
            active_master,
            designspace_doc: None,
        }
    }

    /// Find the default master based on axis default values
    ///
    /// First tries a master sitting exactly on every axis default. Failing
    /// that, picks the master closest to weight 400 on a weight axis, and
    /// finally the first master.
    fn find_default_master(axes: &[DesignAxis], masters: &[Master]) -> usize {
        let default_location: AxisLocation = axes
            .iter()
            .map(|axis| (axis.name.clone(), axis.default))
            .collect();

        if let Some(index) = masters
            .iter()
            .position(|m| m.location.matches(&default_location))
        {
            return index;
        }

        let weight_axis = axes
            .iter()
            .find(|a| a.tag.eq_ignore_ascii_case("wght") || a.name.eq_ignore_ascii_case("weight"));

        let Some(weight_axis) = weight_axis else {
            return 0;
        };

        masters
            .iter()
            .enumerate()
            .filter_map(|(index, m)| {
                m.location
                    .get(&weight_axis.name)
                    .map(|w| (index, (w - 400.0).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Parse axes from the designspace document
    fn parse_axes(doc: &DesignSpaceDocument) -> Vec<DesignAxis> {
        doc.axes
            .iter()
            .map(|axis| DesignAxis {
                tag: axis.tag.clone(),
                name: axis.name.clone(),
                minimum: axis.minimum.unwrap_or(0.0) as f64,
                maximum: axis.maximum.unwrap_or(1000.0) as f64,
                default: axis.default as f64,
            })
            .collect()
    }

    /// Load a single master from a source element
    fn load_master(source: &NoradSource, base_dir: &Path) -> Result<Master> {
        let ufo_path = base_dir.join(&source.filename);

        tracing::debug!(
            "Loading master '{}' from {}",
            source.name.as_deref().unwrap_or("unnamed"),
            ufo_path.display()
        );

        let workspace = Workspace::load(&ufo_path)
            .with_context(|| format!("Failed to load UFO: {}", ufo_path.display()))?;

        let location = source
            .location
            .iter()
            .filter_map(|dim| dim.xvalue.map(|v| (dim.name.clone(), v as f64)))
            .collect();

        let name = source.name.clone().unwrap_or_else(|| {
            ufo_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string()
        });

        let mut master = Master::new(&name, location, workspace);
        if let Some(style_name) = &source.stylename {
            master.style_name = style_name.clone();
        }
        Ok(master)
    }

    /// Master whose layer id is `layer_id`
    pub fn master(&self, layer_id: &str) -> Option<&Master> {
        self.masters.iter().find(|m| m.name == layer_id)
    }

    /// Master sitting exactly at `location`
    pub fn master_for_location(&self, location: &AxisLocation) -> Option<&Master> {
        self.masters.iter().find(|m| m.location.matches(location))
    }

    /// Get the active master
    pub fn active_master(&self) -> Option<&Master> {
        self.masters.get(self.active_master)
    }

    /// Switch to a different master by index
    ///
    /// Returns true if the switch was successful, false if index out of bounds
    pub fn switch_master(&mut self, index: usize) -> bool {
        let Some(master) = self.masters.get(index) else {
            return false;
        };
        tracing::info!("Switched to master: {} ({})", master.name, master.style_name);
        self.active_master = index;
        true
    }

    /// Check if any master has unsaved changes
    pub fn has_unsaved_changes(&self) -> bool {
        self.masters
            .iter()
            .any(|m| read_workspace(&m.workspace).modified)
    }

    /// Save all modified masters and the designspace file
    pub fn save(&self) -> Result<()> {
        for master in &self.masters {
            let mut workspace = write_workspace(&master.workspace);
            if workspace.modified {
                tracing::info!("Saving modified master: {}", master.name);
                workspace.save().with_context(|| {
                    format!("Failed to save UFO: {}", master.ufo_path.display())
                })?;
            }
        }

        if let (Some(doc), Some(path)) = (&self.designspace_doc, &self.path) {
            doc.save(path)
                .with_context(|| format!("Failed to save designspace: {}", path.display()))?;
        }

        tracing::info!("Designspace saved");
        Ok(())
    }
}

impl FontDataProvider for DesignspaceProject {
    fn fetch_layer_data(&self, glyph: &str, layer_id: &str) -> Result<ResolvedLayer, ProviderError> {
        let master = self.master(layer_id).ok_or_else(|| ProviderError::LayerNotFound {
            glyph: glyph.to_string(),
            layer: layer_id.to_string(),
        })?;

        let workspace = read_workspace(&master.workspace);
        let root = workspace
            .layer_data(glyph)
            .cloned()
            .ok_or_else(|| ProviderError::GlyphNotFound(glyph.to_string()))?;

        let root_key = LayerKey::new(glyph, layer_id);
        Ok(LayerArena::resolve(root, &root_key, |key| {
            workspace.layer_data(&key.glyph).cloned()
        }))
    }

    fn save_layer_data(&self, glyph: &str, layer_id: &str, data: &LayerData) -> Result<(), ProviderError> {
        let master = self.master(layer_id).ok_or_else(|| ProviderError::LayerNotFound {
            glyph: glyph.to_string(),
            layer: layer_id.to_string(),
        })?;

        if write_workspace(&master.workspace).update_layer_data(glyph, data) {
            tracing::debug!("Saved layer '{}' of glyph '{}'", layer_id, glyph);
            Ok(())
        } else {
            Err(ProviderError::GlyphNotFound(glyph.to_string()))
        }
    }

    fn master_location(&self, layer_id: &str) -> Option<AxisLocation> {
        self.master(layer_id).map(|m| m.location.clone())
    }

    fn layer_for_location(&self, location: &AxisLocation) -> Option<String> {
        self.master_for_location(location).map(|m| m.name.clone())
    }
}
