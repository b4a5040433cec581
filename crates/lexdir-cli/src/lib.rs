//! # lexdir-cli — Legal Directory Validation CLI
//!
//! Provides the `lexdir` command-line interface over `lexdir-schema`.
//!
//! ## Subcommands
//!
//! - `lexdir check` — validate the manifest's sample documents (default).
//! - `lexdir validate` — validate arbitrary documents against one schema.
//! - `lexdir schemas` — list registered schemas and their `$ref` links.
//!
//! ## Exit codes
//!
//! `0` when every document is valid, `1` when any document is invalid or
//! a schema fails to load or link.
//!
//! ```bash
//! lexdir check
//! lexdir check --all --format json
//! lexdir validate --schema lawyer.schema.json new-lawyer.json
//! ```

pub mod check;
pub mod config;
pub mod report;
pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use lexdir_schema::SchemaRegistry;

use crate::config::{Manifest, MANIFEST_FILE};

/// Resolve a path that may be relative to the repository root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `root`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let root_relative = root.join(path);
    if root_relative.exists() {
        root_relative
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory holding a manifest or a
/// `schemas/` directory.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(MANIFEST_FILE).is_file() || dir.join("schemas").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Load and register the manifest's schemas, then link-check all of them.
///
/// Any load, duplicate-id, or unresolved-reference error is returned before
/// a single document is validated.
pub fn load_registry(root: &Path, manifest: &Manifest) -> Result<SchemaRegistry> {
    let dir = manifest.schemas_dir(root);
    let loaded = if manifest.schemas.is_empty() {
        SchemaRegistry::load_all(&dir)
    } else {
        SchemaRegistry::load_dir(&dir, &manifest.schemas)
    };
    let registry =
        loaded.with_context(|| format!("failed to load JSON schemas from {}", dir.display()))?;

    registry
        .compile_all()
        .context("failed to link JSON schemas")?;

    Ok(registry)
}
