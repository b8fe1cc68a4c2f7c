//! # Report Rendering
//!
//! Human-readable reports printed to stdout. Each writer takes any
//! `io::Write` so tests can render into a buffer.

use std::io::{self, Write};
use std::path::Path;

use mimic_codegen::{ArtifactStatus, StalenessReport};
use mimic_core::DiagnosticsReport;
use mimic_schema::TestCoverageReport;

/// Width of the `=` rule around section titles.
pub const RULE_WIDTH: usize = 70;

/// Command printed when generated files need refreshing.
pub const REMEDIATION: &str = "make generate";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// A title between two rules.
pub fn write_banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "{}", rule())?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", rule())
}

/// Warnings, errors, and the PASS/FAIL verdict of a validation run.
pub fn write_diagnostics(out: &mut impl Write, report: &DiagnosticsReport) -> io::Result<()> {
    if report.warning_count() > 0 {
        writeln!(out)?;
        write_banner(out, &format!("WARNINGS ({})", report.warning_count()))?;
        for warning in report.warnings() {
            writeln!(out, "  {warning}")?;
        }
    }

    if report.has_errors() {
        writeln!(out)?;
        write_banner(out, &format!("ERRORS ({})", report.error_count()))?;
        for error in report.errors() {
            writeln!(out, "  {error}")?;
        }
        writeln!(out)?;
        write_banner(
            out,
            &format!("✗ VALIDATION FAILED - {} error(s) found", report.error_count()),
        )
    } else {
        writeln!(out)?;
        write_banner(out, "✓ VALIDATION PASSED")
    }
}

/// The four-check staleness report.
pub fn write_staleness(out: &mut impl Write, report: &StalenessReport) -> io::Result<()> {
    write_banner(out, "Checking Generated Code Status")?;
    writeln!(out)?;

    writeln!(out, "[1/4] Checking metadata files...")?;
    if report.inputs_present() {
        writeln!(out, "✓ All {} metadata inputs present", report.inputs.len())?;
    } else {
        for input in report.inputs.iter().filter(|i| !i.exists) {
            writeln!(out, "✗ MISSING: {}", input.path.display())?;
        }
        if let Some(err) = &report.load_error {
            writeln!(out, "✗ ERROR: cannot compute source hash ({err})")?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[2/4] Checking generated files...")?;
    if report.artifacts_present() {
        writeln!(out, "✓ All {} generated files present", report.artifacts.len())?;
    } else {
        for missing in report.with_status(|s| matches!(s, ArtifactStatus::Missing)) {
            writeln!(out, "✗ MISSING: {}", missing.kind)?;
            writeln!(out, "  Expected: {}", missing.path.display())?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[3/4] Checking source hash consistency...")?;
    if report.hashes_match() {
        writeln!(out, "✓ Generated files match current metadata ({})", strategy_note(report))?;
    } else {
        writeln!(out, "✗ OUT OF DATE: metadata changed, generated files need updating")?;
        writeln!(out)?;
        let current = report
            .current_hash
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "(unavailable)".to_string());
        writeln!(out, "  Current source hash: {current}")?;
        writeln!(out)?;
        writeln!(out, "  Files need regeneration:")?;
        for stale in report.with_status(|s| matches!(s, ArtifactStatus::Stale { .. })) {
            let embedded = match &stale.status {
                ArtifactStatus::Stale {
                    embedded: Some(hash),
                } => hash.to_string(),
                _ => "(missing)".to_string(),
            };
            writeln!(out, "    - {} (embedded: {embedded})", stale.file_name())?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[4/4] Checking AUTO-GENERATED markers...")?;
    if report.markers_present() {
        writeln!(out, "✓ All generated files have proper markers")?;
    } else {
        writeln!(out, "✗ WARNING: Files missing AUTO-GENERATED marker")?;
        writeln!(out, "  (May be hand-written files, not generated)")?;
        for unmarked in report.with_status(|s| matches!(s, ArtifactStatus::MarkerAbsent)) {
            writeln!(out, "    - {}", unmarked.file_name())?;
        }
    }
    writeln!(out)?;

    if report.passed() {
        write_banner(out, "✓ PASS: All checks passed")?;
        writeln!(out)?;
        writeln!(out, "Generated code is up-to-date with metadata.")
    } else {
        write_banner(out, &format!("✗ FAIL: {} check(s) failed", report.failed_checks()))?;
        writeln!(out)?;
        writeln!(out, "ACTION REQUIRED:")?;
        writeln!(out, "  Run: {REMEDIATION}")?;
        writeln!(out)?;
        writeln!(out, "Then commit the updated generated files.")
    }
}

fn strategy_note(report: &StalenessReport) -> &'static str {
    match report.strategy {
        mimic_codegen::CheckStrategy::Hash => "hash verified",
        mimic_codegen::CheckStrategy::Mtime => "timestamps verified",
    }
}

/// Per-module test declarations and the summary counts.
pub fn write_coverage(
    out: &mut impl Write,
    report: &TestCoverageReport,
    repo_root: &Path,
) -> io::Result<()> {
    writeln!(out, "Validating module test declarations...")?;
    writeln!(out, "{}", rule())?;

    for module in &report.modules {
        if let Some(reason) = &module.unreadable {
            writeln!(out, "ERROR: {}: {reason}", module.module)?;
            continue;
        }
        for test in &module.declared {
            let kind = test.kind.to_string();
            if test.exists() {
                writeln!(out, "✓ {:20} {kind:12} test: {}", module.module, test.file)?;
            } else {
                writeln!(out, "✗ {:20} {kind:12} test: {} NOT FOUND", module.module, test.file)?;
            }
        }
        for kind in &module.undeclared {
            tracing::debug!(module = %module.module, %kind, "no test declared");
        }
    }

    writeln!(out)?;
    write_banner(out, "Validation Summary")?;
    let missing: Vec<_> = report.missing().collect();
    writeln!(out, "Modules checked:      {}", report.modules_checked())?;
    writeln!(out, "Tests validated:      {}", report.tests_found())?;
    writeln!(out, "Missing tests:        {}", missing.len())?;

    if !missing.is_empty() {
        writeln!(out)?;
        writeln!(out, "Missing test files:")?;
        for (module, test) in &missing {
            let expected = test
                .expected_at
                .strip_prefix(repo_root)
                .unwrap_or(&test.expected_at);
            writeln!(out, "  • {module}/{}", test.file)?;
            writeln!(out, "    Expected at: {}", expected.display())?;
        }
    }

    writeln!(out)?;
    if report.passed() {
        writeln!(out, "✓ ALL MODULE TESTS VALIDATED")
    } else {
        writeln!(out, "✗ VALIDATION FAILED - Missing test files")
    }
}
