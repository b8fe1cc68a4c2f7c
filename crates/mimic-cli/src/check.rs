//! # Check Subcommand
//!
//! Reports whether the generated tree matches the current metadata without
//! regenerating anything. Intended for CI: exit 0 when current, 1 otherwise.

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};

use mimic_codegen::{CheckStrategy, StalenessChecker};
use mimic_core::Layout;

use crate::report;

/// How generated files are compared with their inputs.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyArg {
    /// Compare the embedded source hash with the current inputs.
    #[default]
    Hash,
    /// Compare modification times with the newest input.
    Mtime,
}

impl From<StrategyArg> for CheckStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hash => CheckStrategy::Hash,
            StrategyArg::Mtime => CheckStrategy::Mtime,
        }
    }
}

/// Arguments for `mimicgen check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Comparison strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Hash)]
    pub strategy: StrategyArg,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, repo_root: &Path, layout: &Layout) -> Result<u8> {
    let staleness = StalenessChecker::new(repo_root, layout).check(args.strategy.into());
    report::write_staleness(&mut std::io::stdout().lock(), &staleness)?;

    if staleness.passed() {
        Ok(0)
    } else {
        tracing::info!(failed = staleness.failed_checks(), "generated files are not current");
        Ok(1)
    }
}
