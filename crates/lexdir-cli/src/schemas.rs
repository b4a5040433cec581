//! # Schemas Subcommand
//!
//! Lists the registered schemas with their source file and the `$id`s they
//! reference. Loading goes through the same link check as `check`, so a
//! clean listing means every `$ref` resolves.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use lexdir_schema::SchemaRegistry;

use crate::config::Manifest;
use crate::report::OutputFormat;

/// Arguments for the `lexdir schemas` subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemasArgs {
    /// Listing format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    /// Declared `$id`.
    pub id: String,
    /// File the schema was loaded from.
    pub file: String,
    /// External `$ref` targets.
    pub references: Vec<String>,
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, root: &Path, manifest: &Manifest) -> Result<u8> {
    let registry = crate::load_registry(root, manifest)?;
    let entries = list_schemas(&registry);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => {
            for entry in &entries {
                writeln!(out, "{}  {}", entry.file, entry.id)?;
                for reference in &entry.references {
                    writeln!(out, "    -> {reference}")?;
                }
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &entries)
                .context("failed to serialize schema listing")?;
            writeln!(out)?;
        }
    }

    Ok(0)
}

/// Registry contents in `$id` order.
pub fn list_schemas(registry: &SchemaRegistry) -> Vec<SchemaEntry> {
    registry
        .iter()
        .map(|schema| SchemaEntry {
            id: schema.id().to_string(),
            file: schema
                .file_name()
                .map_or_else(|| schema.path().display().to_string(), str::to_owned),
            references: schema.external_references(),
        })
        .collect()
}
