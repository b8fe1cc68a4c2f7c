//! # Generate Subcommand
//!
//! Load, validate, resolve and emit. Validation is exhaustive but
//! generation is fail-fast: any error stops the run before a single file is
//! written, and the exit code is the class of the first error.
//!
//! When the hash file already records the current source hash and every
//! artifact exists, nothing is rewritten unless `--force` is given.
//! `--dry-run` prints every rendered artifact under a
//! `=== <file> (DRY RUN) ===` banner instead of writing it.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use mimic_codegen::{emit_all, is_current, write_all, EmitContext};
use mimic_core::{Layout, SchemaTables};
use mimic_schema::{SchemaValidator, SpecLoader};

use crate::report;

/// Arguments for `mimicgen generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Render everything and print it instead of writing files.
    #[arg(long)]
    pub dry_run: bool,

    /// Rewrite artifacts even if the recorded hash is current.
    #[arg(long)]
    pub force: bool,

    /// Pin the `Generated on:` timestamp (RFC 3339 or `YYYY-MM-DD HH:MM:SS`).
    #[arg(long, value_name = "TIMESTAMP")]
    pub generated_at: Option<String>,
}

/// Execute the generate subcommand, reporting to stdout.
pub fn run_generate(args: &GenerateArgs, repo_root: &Path, layout: &Layout) -> Result<u8> {
    let mut stdout = std::io::stdout().lock();
    generate_to(&mut stdout, args, repo_root, layout)
}

/// Execute the generate subcommand, reporting to `stdout`.
pub fn generate_to(
    stdout: &mut impl Write,
    args: &GenerateArgs,
    repo_root: &Path,
    layout: &Layout,
) -> Result<u8> {
    let specs = SpecLoader::new(repo_root, layout)
        .load()
        .context("failed to load metadata")?;
    let validator =
        SchemaValidator::new(SchemaTables::standard()).context("failed to build metadata schemas")?;

    let validation = validator.validate(&specs, layout);
    if validation.report.has_errors() {
        report::write_diagnostics(stdout, &validation.report)?;
        writeln!(stdout, "\nFAIL: generation aborted, no files written")?;
        return Ok(validation.report.exit_code());
    }
    for warning in validation.report.warnings() {
        writeln!(stdout, "WARN: {warning}")?;
    }
    let Some(model) = validation.model else {
        anyhow::bail!("validation passed but produced no model");
    };

    let hash = model.source_hash.clone();
    if !args.force && !args.dry_run && is_current(repo_root, layout, &hash) {
        writeln!(stdout, "OK: generated files are up to date (source hash {})", short(&hash))?;
        return Ok(0);
    }

    let generated_at = crate::resolve_generated_at(
        args.generated_at.as_deref(),
        std::env::var(crate::SOURCE_DATE_EPOCH).ok().as_deref(),
    )?;
    let ctx = EmitContext::new(&model, &validator.tables().types, layout, generated_at)?;
    let artifacts = emit_all(&ctx).context("failed to render artifacts")?;
    tracing::debug!(count = artifacts.len(), modules = ctx.order.len(), "rendered artifacts");

    if args.dry_run {
        for artifact in &artifacts {
            writeln!(stdout, "=== {} (DRY RUN) ===", artifact.path.display())?;
            stdout.write_all(artifact.content.as_bytes())?;
            if !artifact.content.ends_with('\n') {
                writeln!(stdout)?;
            }
            writeln!(stdout)?;
        }
        writeln!(stdout, "DRY RUN: {} files rendered, none written", artifacts.len())?;
        return Ok(0);
    }

    let written = write_all(repo_root, &artifacts).context("failed to write artifacts")?;
    writeln!(
        stdout,
        "OK: generated {} files from {} properties and {} modules (source hash {})",
        written.len(),
        model.properties.len(),
        model.modules.len(),
        short(&hash)
    )?;
    Ok(0)
}

fn short(hash: &mimic_core::SourceHash) -> &str {
    &hash.as_str()[..12]
}
