//! # lexdir CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! With no subcommand, runs `check`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lexdir_cli::check::{run_check, CheckArgs};
use lexdir_cli::config::{Manifest, MANIFEST_FILE};
use lexdir_cli::schemas::{run_schemas, SchemasArgs};
use lexdir_cli::validate::{run_validate, ValidateArgs};

/// Legal directory data model validation.
///
/// Loads the lawyer, law firm, address, certification, and specialization
/// JSON schemas, links them by `$id`, and validates sample documents against
/// them, reporting every violation.
#[derive(Parser, Debug)]
#[command(name = "lexdir", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root holding `schemas/`, `samples/`, and `lexdir.yaml`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Path to the run manifest (default: `<root>/lexdir.yaml`).
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the manifest's sample documents against their schemas.
    Check(CheckArgs),

    /// Validate documents against one registered schema.
    Validate(ValidateArgs),

    /// List registered schemas and the schemas they reference.
    Schemas(SchemasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let root = match cli.root {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir()?;
            lexdir_cli::find_repo_root(&cwd).unwrap_or_else(|| {
                tracing::warn!("Could not locate repository root; using current directory");
                cwd
            })
        }
    };
    tracing::debug!(root = %root.display(), "resolved repository root");

    let manifest = match cli.manifest {
        Some(path) => Manifest::load(&lexdir_cli::resolve_path(&path, &root))?,
        None => Manifest::load_or_default(&root.join(MANIFEST_FILE))?,
    };

    match cli.command.unwrap_or(Commands::Check(CheckArgs::default())) {
        Commands::Check(args) => run_check(&args, &root, &manifest),
        Commands::Validate(args) => run_validate(&args, &root, &manifest),
        Commands::Schemas(args) => run_schemas(&args, &root, &manifest),
    }
}
