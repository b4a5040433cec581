//! # Check Subcommand
//!
//! Validates the sample documents named in the manifest against their
//! schemas and prints the report. With `--all`, every
//! `samples/<name>-example.json` whose `<name>.schema.json` is registered is
//! checked as well.
//!
//! Schema load and link errors abort the run before any document is read.
//! Invalid documents never abort it.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use lexdir_schema::{load_document, SchemaRegistry};

use crate::config::{CheckPair, Manifest};
use crate::report::{CheckOutcome, OutputFormat, Report};

/// File-name suffix of sample documents discovered by `--all`.
const SAMPLE_SUFFIX: &str = "-example.json";

/// Arguments for the `lexdir check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Also check every `<name>-example.json` sample that has a matching
    /// `<name>.schema.json`.
    #[arg(long)]
    pub all: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 if every document is valid, 1 otherwise.
pub fn run_check(args: &CheckArgs, root: &Path, manifest: &Manifest) -> Result<u8> {
    let registry = crate::load_registry(root, manifest)?;
    let samples_dir = manifest.samples_dir(root);

    let mut pairs = manifest.checks.clone();
    if args.all {
        for pair in discover_sample_pairs(&registry, &samples_dir)? {
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }

    let report = check_pairs(&registry, &samples_dir, &pairs)?;

    tracing::info!(
        checked = report.checks().len(),
        failed = report.failed_count(),
        "validation run complete"
    );

    let stdout = std::io::stdout();
    report
        .write(args.format, &mut stdout.lock())
        .context("failed to write report")?;

    Ok(report.exit_code())
}

/// Validate each pair in order and collect the outcomes.
///
/// Every schema named by a pair is compiled before the first document is
/// loaded, so an unknown schema aborts the run without partial output.
pub fn check_pairs(
    registry: &SchemaRegistry,
    samples_dir: &Path,
    pairs: &[CheckPair],
) -> Result<Report> {
    let validators = pairs
        .iter()
        .map(|pair| {
            registry
                .compile(&pair.schema)
                .with_context(|| format!("cannot check {}", pair.document))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut report = Report::new();
    for (pair, validator) in pairs.iter().zip(&validators) {
        let document = load_document(&samples_dir.join(&pair.document))?;
        let result = validator.validate(&document);

        tracing::debug!(
            schema = %pair.schema,
            document = %pair.document,
            violations = result.violations().len(),
            "validated document"
        );

        report.push(CheckOutcome {
            schema: pair.schema.clone(),
            document: pair.document.clone(),
            result,
        });
    }
    Ok(report)
}

/// Pair each `<name>-example.json` in `samples_dir` with a registered
/// `<name>.schema.json`, sorted by document name.
///
/// Samples with no registered schema are skipped with a warning. A missing
/// samples directory yields no pairs.
pub fn discover_sample_pairs(
    registry: &SchemaRegistry,
    samples_dir: &Path,
) -> Result<Vec<CheckPair>> {
    if !samples_dir.is_dir() {
        tracing::warn!(dir = %samples_dir.display(), "samples directory not found");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(samples_dir)
        .with_context(|| format!("failed to read {}", samples_dir.display()))?;

    let mut pairs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Some(stem) = name.strip_suffix(SAMPLE_SUFFIX) else {
            continue;
        };
        let schema = format!("{stem}.schema.json");
        if registry.resolve_name(&schema).is_some() {
            pairs.push(CheckPair::new(schema, name));
        } else {
            tracing::warn!(document = %name, schema = %schema, "no registered schema for sample; skipping");
        }
    }

    pairs.sort_by(|a, b| a.document.cmp(&b.document));
    Ok(pairs)
}
