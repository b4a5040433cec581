//! # Validate Subcommand
//!
//! Validates arbitrary documents (JSON or YAML) against one registered
//! schema, named by file name or `$id`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use lexdir_schema::load_document;

use crate::config::Manifest;
use crate::report::{CheckOutcome, OutputFormat, Report};

/// Arguments for the `lexdir validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema to validate against: a registered file name or `$id`.
    #[arg(long, short)]
    pub schema: String,

    /// Documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, root: &Path, manifest: &Manifest) -> Result<u8> {
    let report = validate_documents(args, root, manifest)?;

    let stdout = std::io::stdout();
    report
        .write(args.format, &mut stdout.lock())
        .context("failed to write report")?;

    Ok(report.exit_code())
}

fn validate_documents(args: &ValidateArgs, root: &Path, manifest: &Manifest) -> Result<Report> {
    let registry = crate::load_registry(root, manifest)?;
    let validator = registry
        .compile(&args.schema)
        .with_context(|| format!("cannot validate against {}", args.schema))?;

    let mut report = Report::new();
    for path in &args.documents {
        let resolved = crate::resolve_path(path, root);
        let document = load_document(&resolved)?;
        report.push(CheckOutcome {
            schema: args.schema.clone(),
            document: path.display().to_string(),
            result: validator.validate(&document),
        });
    }
    Ok(report)
}
