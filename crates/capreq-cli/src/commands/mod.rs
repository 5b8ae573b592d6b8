//! CLI command implementations.

pub mod check;
pub mod config;
pub mod select;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capreq_core::Registry;
use tracing::{info, warn};

/// Read a capabilities document.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read capabilities from {}", path.display()))?;
    let registry = Registry::from_json_str(&contents)
        .with_context(|| format!("Invalid capabilities document {}", path.display()))?;
    info!(path = %path.display(), count = registry.len(), "Loaded capabilities");
    Ok(registry)
}

/// The base registry: the given file, else an empty registry.
pub fn load_base(path: Option<&PathBuf>) -> Result<Registry> {
    match path {
        Some(path) => load_registry(path),
        None => {
            warn!("No capabilities file given; checking against an empty registry");
            Ok(Registry::new())
        }
    }
}

/// Optional per-check capabilities merged on top of the base.
pub fn load_extra(path: Option<&PathBuf>) -> Result<Option<Registry>> {
    path.map(|p| load_registry(p)).transpose()
}
