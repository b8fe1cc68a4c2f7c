//! # mimic-cli — The `mimicgen` Command
//!
//! Thin handlers over the library crates. Each subcommand parses its own
//! `clap` arguments, calls into `mimic-schema`/`mimic-codegen`, prints a
//! human report to stdout and returns the process exit code.
//!
//! ## Subcommands
//!
//! - `mimicgen generate` — validate, then write every artifact
//! - `mimicgen validate [MODULE_PATH]` — validate only, exit with the class of
//!   the first error
//! - `mimicgen check` — report whether generated files match their inputs
//! - `mimicgen check-tests` — report declared test files that do not exist
//!
//! Typical build integration:
//!
//! ```bash
//! mimicgen generate
//! mimicgen check --strategy hash
//! ```

pub mod check;
pub mod generate;
pub mod report;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use mimic_core::Layout;

/// Environment variable pinning the generation timestamp.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `repo_root` resolves there; otherwise it stays relative to the current
/// directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Load the layout from `--config`, `mimicgen.yaml` at the root, or defaults.
pub fn load_layout(repo_root: &Path, config: Option<&Path>) -> Result<Layout> {
    let config = config.map(|path| resolve_path(path, repo_root));
    Layout::discover(repo_root, config.as_deref())
        .with_context(|| format!("failed to load configuration for {}", repo_root.display()))
}

/// Resolve the generation timestamp.
///
/// Priority:
/// 1. Explicit `--generated-at` (RFC 3339 or `YYYY-MM-DD HH:MM:SS` UTC)
/// 2. `SOURCE_DATE_EPOCH` seconds
/// 3. Current UTC time
pub fn resolve_generated_at(
    flag: Option<&str>,
    source_date_epoch: Option<&str>,
) -> Result<DateTime<Utc>> {
    if let Some(ts) = flag {
        return parse_timestamp(ts);
    }

    if let Some(epoch_str) = source_date_epoch {
        match epoch_str.trim().parse::<i64>() {
            Ok(epoch) => {
                if let Some(dt) = DateTime::from_timestamp(epoch, 0) {
                    return Ok(dt);
                }
                tracing::warn!(value = epoch_str, "SOURCE_DATE_EPOCH out of range, ignoring");
            }
            Err(_) => tracing::warn!(value = epoch_str, "SOURCE_DATE_EPOCH is not an integer, ignoring"),
        }
    }

    Ok(Utc::now())
}

fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    bail!("invalid --generated-at '{ts}': expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_epoch() {
        let dt = resolve_generated_at(Some("2024-06-01T12:00:00Z"), Some("0")).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_plain_timestamp_is_utc() {
        let dt = resolve_generated_at(Some("2024-06-01 12:30:00"), None).unwrap();
        assert_eq!(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2024-06-01T12:30:00Z");
    }

    #[test]
    fn test_source_date_epoch() {
        let dt = resolve_generated_at(None, Some("86400")).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "1970-01-02 00:00:00");
    }

    #[test]
    fn test_bad_epoch_falls_back_to_now() {
        let before = Utc::now();
        let dt = resolve_generated_at(None, Some("yesterday")).unwrap();
        assert!(dt >= before);
    }

    #[test]
    fn test_bad_flag_is_error() {
        assert!(resolve_generated_at(Some("June 1st"), None).is_err());
    }

    #[test]
    fn test_resolve_path_prefers_repo_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mimicgen.yaml"), "").unwrap();
        assert_eq!(
            resolve_path(Path::new("mimicgen.yaml"), dir.path()),
            dir.path().join("mimicgen.yaml")
        );
        assert_eq!(
            resolve_path(Path::new("absent.yaml"), dir.path()),
            PathBuf::from("absent.yaml")
        );
    }

    #[test]
    fn test_load_layout_reads_root_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mimicgen.yaml"), "modules_dir: physics\n").unwrap();
        let layout = load_layout(dir.path(), None).unwrap();
        assert_eq!(layout.modules_dir, PathBuf::from("physics"));
    }
}
