//! # mimicgen entry point
//!
//! Parses command-line arguments, installs logging, locates the repository
//! and dispatches to subcommand handlers. Logs go to stderr; stdout carries
//! only the reports.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mimic_cli::check::{run_check, CheckArgs};
use mimic_cli::check_tests::{run_check_tests, CheckTestsArgs};
use mimic_cli::generate::{run_generate, GenerateArgs};
use mimic_cli::validate::{run_validate, ValidateArgs};

/// Mimic metadata code generator.
///
/// Validates property and module metadata, generates C structs, include
/// fragments, HDF5 field tables, NumPy dtypes, module registration, build
/// fragments and reference docs, and checks that generated code is current.
#[derive(Parser, Debug)]
#[command(name = "mimicgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a layout configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository root. Defaults to the nearest ancestor holding `metadata/` and `src/`.
    #[arg(long, global = true)]
    repo_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate metadata and write every generated artifact.
    Generate(GenerateArgs),

    /// Validate metadata without generating.
    Validate(ValidateArgs),

    /// Check that generated files match the current metadata.
    Check(CheckArgs),

    /// Check that every declared module test file exists.
    #[command(name = "check-tests")]
    CheckTests(CheckTestsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

    tracing::debug!("mimicgen {} starting", env!("CARGO_PKG_VERSION"));

    let repo_root = cli.repo_root.clone().or_else(resolve_repo_root).unwrap_or_else(|| {
        tracing::warn!("Could not locate repository root; using current directory");
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });

    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let layout = match mimic_cli::load_layout(&repo_root, cli.config.as_deref()) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args, &repo_root, &layout),
        Commands::Validate(args) => run_validate(&args, &repo_root, &layout),
        Commands::Check(args) => run_check(&args, &repo_root, &layout),
        Commands::CheckTests(args) => run_check_tests(&args, &repo_root, &layout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Walk up from the current directory to find the repository root.
///
/// The root holds both `metadata/` and `src/`.
fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join("metadata").is_dir() && dir.join("src").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
