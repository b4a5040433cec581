//! # Run Manifest
//!
//! `lexdir.yaml` at the repository root names the schema files to register
//! and the (schema, sample document) pairs that `lexdir check` validates.
//! Every field is optional; a missing file means the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default manifest file name, looked up in the repository root.
pub const MANIFEST_FILE: &str = "lexdir.yaml";

/// Schema files registered by default, in registration order.
pub const DEFAULT_SCHEMAS: [&str; 5] = [
    "address.schema.json",
    "certification.schema.json",
    "specialization.schema.json",
    "lawfirm.schema.json",
    "lawyer.schema.json",
];

/// One document to validate against one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckPair {
    /// Schema file name or `$id`.
    pub schema: String,
    /// Document file name, relative to the samples directory.
    pub document: String,
}

impl CheckPair {
    /// Convenience constructor.
    pub fn new(schema: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            document: document.into(),
        }
    }
}

/// Parsed `lexdir.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Directory holding the schema files, relative to the root.
    pub schemas_dir: PathBuf,
    /// Directory holding the sample documents, relative to the root.
    pub samples_dir: PathBuf,
    /// Schema files to register. Empty means every `*.schema.json` in
    /// `schemas_dir`.
    pub schemas: Vec<String>,
    /// Pairs validated by `lexdir check`.
    pub checks: Vec<CheckPair>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schemas_dir: PathBuf::from("schemas"),
            samples_dir: PathBuf::from("samples"),
            schemas: DEFAULT_SCHEMAS.iter().map(|s| s.to_string()).collect(),
            checks: vec![
                CheckPair::new("lawyer.schema.json", "lawyer-example.json"),
                CheckPair::new("lawfirm.schema.json", "lawfirm-example.json"),
            ],
        }
    }
}

impl Manifest {
    /// Parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }

    /// Parse `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading manifest");
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no manifest found; using defaults");
            Ok(Self::default())
        }
    }

    /// Absolute schema directory for a given repository root.
    pub fn schemas_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.schemas_dir)
    }

    /// Absolute samples directory for a given repository root.
    pub fn samples_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.samples_dir)
    }
}
