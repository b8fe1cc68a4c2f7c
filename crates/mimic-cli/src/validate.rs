//! # Validate Subcommand
//!
//! Runs every metadata rule without writing anything. With `MODULE_PATH`
//! only that module is checked, against the full property set.
//!
//! Exit code: 0 when no error was recorded, otherwise the class of the first
//! error (1 schema, 2 file not found, 3 dependency, 4 naming, 5 parameter,
//! 6 code verification).

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use mimic_core::{Layout, SchemaTables};
use mimic_schema::{SchemaValidator, SpecLoader};

use crate::report;

/// Arguments for `mimicgen validate`.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Validate only the module in this directory.
    #[arg(value_name = "MODULE_PATH")]
    pub module: Option<PathBuf>,

    /// Print the diagnostics as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, repo_root: &Path, layout: &Layout) -> Result<u8> {
    let loader = SpecLoader::new(repo_root, layout);
    let specs = match &args.module {
        Some(dir) => {
            let dir = crate::resolve_path(dir, repo_root);
            loader
                .load_single(&dir)
                .with_context(|| format!("failed to load module at {}", dir.display()))?
        }
        None => loader.load().context("failed to load metadata")?,
    };

    let validator =
        SchemaValidator::new(SchemaTables::standard()).context("failed to build metadata schemas")?;
    let validation = validator.validate(&specs, layout);
    let diagnostics = &validation.report;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, diagnostics)?;
        writeln!(stdout)?;
        return Ok(diagnostics.exit_code());
    }

    report::write_banner(&mut stdout, "Module Metadata Validation")?;
    writeln!(stdout)?;
    writeln!(
        stdout,
        "Validated {} properties and {} module(s)",
        specs.halo.entries.as_ref().map_or(0, Vec::len)
            + specs.galaxy.entries.as_ref().map_or(0, Vec::len),
        specs.modules.len()
    )?;
    report::write_diagnostics(&mut stdout, diagnostics)?;

    tracing::debug!(
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "validation finished"
    );
    Ok(diagnostics.exit_code())
}
