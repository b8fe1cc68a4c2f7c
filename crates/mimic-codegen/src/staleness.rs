//! # Staleness Checking
//!
//! Decides whether the generated tree still matches its inputs without
//! regenerating it. Under the hash strategy every artifact's embedded
//! `Source hash:` must equal the hash of the current inputs. The mtime
//! strategy only asks whether any input is newer than the artifact.
//!
//! The report splits the verdict into four independent checks so that a
//! failing run says which kind of drift happened:
//!
//! 1. every input exists and loads,
//! 2. every artifact exists,
//! 3. every artifact is current,
//! 4. every artifact carries the generated-file marker.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use mimic_core::{Layout, SourceHash};
use mimic_schema::SpecLoader;

use crate::artifact::ArtifactKind;
use crate::header::{HASH_LABEL, HEADER_SCAN_LINES, MARKER};

/// The hash embedded in the leading lines of `text`, if any.
///
/// The hash is the run of hex digits following [`HASH_LABEL`], so trailing
/// punctuation (as in the JSON `_comment`) is ignored.
pub fn extract_embedded_hash(text: &str) -> Option<SourceHash> {
    text.lines().take(HEADER_SCAN_LINES).find_map(|line| {
        let start = line.find(HASH_LABEL)? + HASH_LABEL.len();
        let rest = line[start..].trim_start();
        let end = rest
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(rest.len());
        SourceHash::from_hex(&rest[..end])
    })
}

/// Whether the leading lines of `text` carry the generated-file marker.
pub fn has_marker(text: &str) -> bool {
    text.lines()
        .take(HEADER_SCAN_LINES)
        .any(|line| line.contains(MARKER))
}

/// How artifacts are compared with their inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckStrategy {
    /// Embedded hash equals the current input hash.
    #[default]
    Hash,
    /// Artifact is not older than the newest input.
    Mtime,
}

/// Verdict for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Matches the current inputs.
    UpToDate,
    /// Generated from different inputs. `embedded` is the hash found in the
    /// header, if one was found.
    Stale {
        /// Hash read from the artifact.
        embedded: Option<SourceHash>,
    },
    /// Exists but has no generated-file marker.
    MarkerAbsent,
    /// Does not exist.
    Missing,
}

/// One input file and whether it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStatus {
    /// Repository-relative path.
    pub path: PathBuf,
    /// Whether the path exists.
    pub exists: bool,
}

/// One artifact and its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    /// Which artifact.
    pub kind: ArtifactKind,
    /// Repository-relative path.
    pub path: PathBuf,
    /// Verdict.
    pub status: ArtifactStatus,
}

impl ArtifactCheck {
    /// File name, for reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of a staleness check.
#[derive(Debug, Clone)]
pub struct StalenessReport {
    /// Strategy used.
    pub strategy: CheckStrategy,
    /// Hash of the current inputs, if they loaded.
    pub current_hash: Option<SourceHash>,
    /// Why the inputs failed to load, if they did.
    pub load_error: Option<String>,
    /// Input files.
    pub inputs: Vec<InputStatus>,
    /// Every artifact in write order.
    pub artifacts: Vec<ArtifactCheck>,
}

impl StalenessReport {
    /// Check 1: inputs exist and load.
    pub fn inputs_present(&self) -> bool {
        self.load_error.is_none() && self.inputs.iter().all(|i| i.exists)
    }

    /// Check 2: no artifact is missing.
    pub fn artifacts_present(&self) -> bool {
        !self.any_status(|s| matches!(s, ArtifactStatus::Missing))
    }

    /// Check 3: no artifact is stale.
    pub fn hashes_match(&self) -> bool {
        !self.any_status(|s| matches!(s, ArtifactStatus::Stale { .. }))
    }

    /// Check 4: every existing artifact carries the marker.
    pub fn markers_present(&self) -> bool {
        !self.any_status(|s| matches!(s, ArtifactStatus::MarkerAbsent))
    }

    /// Number of the four checks that failed.
    pub fn failed_checks(&self) -> usize {
        [
            self.inputs_present(),
            self.artifacts_present(),
            self.hashes_match(),
            self.markers_present(),
        ]
        .iter()
        .filter(|ok| !**ok)
        .count()
    }

    /// Every check passed.
    pub fn passed(&self) -> bool {
        self.failed_checks() == 0
    }

    /// Artifacts with the given status shape.
    pub fn with_status<'s>(
        &'s self,
        pred: impl Fn(&ArtifactStatus) -> bool + 's,
    ) -> impl Iterator<Item = &'s ArtifactCheck> + 's {
        self.artifacts.iter().filter(move |a| pred(&a.status))
    }

    fn any_status(&self, pred: impl Fn(&ArtifactStatus) -> bool) -> bool {
        self.artifacts.iter().any(|a| pred(&a.status))
    }
}

/// Compares the generated tree under a repository root with its inputs.
#[derive(Debug, Clone)]
pub struct StalenessChecker<'a> {
    root: &'a Path,
    layout: &'a Layout,
}

impl<'a> StalenessChecker<'a> {
    /// Checker for the repository at `root`.
    pub fn new(root: &'a Path, layout: &'a Layout) -> Self {
        Self { root, layout }
    }

    /// Run every check.
    pub fn check(&self, strategy: CheckStrategy) -> StalenessReport {
        let mut input_paths = vec![
            self.layout.halo_properties.clone(),
            self.layout.galaxy_properties.clone(),
            self.layout.modules_dir.clone(),
        ];

        let (current_hash, load_error) = match SpecLoader::new(self.root, self.layout).load() {
            Ok(specs) => {
                input_paths.extend(
                    specs
                        .modules
                        .iter()
                        .map(|m| self.relative(&m.manifest)),
                );
                (Some(specs.source_hash), None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "inputs failed to load");
                (None, Some(e.to_string()))
            }
        };

        let inputs: Vec<InputStatus> = input_paths
            .into_iter()
            .map(|path| InputStatus {
                exists: self.root.join(&path).exists(),
                path,
            })
            .collect();

        let newest_input = match strategy {
            CheckStrategy::Mtime => self.newest_mtime(&inputs),
            CheckStrategy::Hash => None,
        };

        let artifacts = ArtifactKind::ALL
            .iter()
            .map(|&kind| {
                let path = kind.path(self.layout);
                let status = self.artifact_status(&path, strategy, current_hash.as_ref(), newest_input);
                tracing::debug!(path = %path.display(), ?status, "checked artifact");
                ArtifactCheck { kind, path, status }
            })
            .collect();

        StalenessReport {
            strategy,
            current_hash,
            load_error,
            inputs,
            artifacts,
        }
    }

    fn artifact_status(
        &self,
        path: &Path,
        strategy: CheckStrategy,
        current: Option<&SourceHash>,
        newest_input: Option<SystemTime>,
    ) -> ArtifactStatus {
        let absolute = self.root.join(path);
        if !absolute.is_file() {
            return ArtifactStatus::Missing;
        }
        let text = match std::fs::read_to_string(&absolute) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %absolute.display(), error = %e, "artifact unreadable");
                return ArtifactStatus::MarkerAbsent;
            }
        };
        if !has_marker(&text) {
            return ArtifactStatus::MarkerAbsent;
        }
        let embedded = extract_embedded_hash(&text);

        let current = match strategy {
            CheckStrategy::Hash => current.is_some() && embedded.as_ref() == current,
            CheckStrategy::Mtime => match (newest_input, modified(&absolute)) {
                (Some(input), Some(artifact)) => artifact >= input,
                _ => false,
            },
        };
        if current {
            ArtifactStatus::UpToDate
        } else {
            ArtifactStatus::Stale { embedded }
        }
    }

    fn newest_mtime(&self, inputs: &[InputStatus]) -> Option<SystemTime> {
        inputs
            .iter()
            .map(|i| self.root.join(&i.path))
            .filter(|p| p.is_file())
            .filter_map(|p| modified(&p))
            .max()
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::SourceHasher;

    fn hash_of(text: &str) -> SourceHash {
        let mut hasher = SourceHasher::new();
        hasher.update("x", text.as_bytes());
        hasher.finish()
    }

    #[test]
    fn test_extract_from_each_header_style() {
        let hash = hash_of("a");
        for text in [
            format!("/* AUTO-GENERATED CODE - DO NOT EDIT\n *\n * Source hash: {hash}\n */\n"),
            format!("# AUTO-GENERATED CODE - DO NOT EDIT\n# Source hash: {hash}\n"),
            format!("{{\n  \"_comment\": \"AUTO-GENERATED - DO NOT EDIT. Source hash: {hash}. To regenerate\"\n}}\n"),
        ] {
            assert_eq!(extract_embedded_hash(&text), Some(hash.clone()), "{text}");
            assert!(has_marker(&text));
        }
    }

    #[test]
    fn test_hash_beyond_scan_window_is_ignored() {
        let hash = hash_of("a");
        let text = format!("{}Source hash: {hash}\n", "line\n".repeat(HEADER_SCAN_LINES));
        assert_eq!(extract_embedded_hash(&text), None);
        assert!(!has_marker("int x;\n"));
    }

    #[test]
    fn test_report_categories() {
        let check = |status| ArtifactCheck {
            kind: ArtifactKind::PropertyDefs,
            path: PathBuf::from("src/include/generated/property_defs.h"),
            status,
        };
        let mut report = StalenessReport {
            strategy: CheckStrategy::Hash,
            current_hash: Some(hash_of("a")),
            load_error: None,
            inputs: vec![InputStatus {
                path: PathBuf::from("halo.yaml"),
                exists: true,
            }],
            artifacts: vec![check(ArtifactStatus::UpToDate)],
        };
        assert!(report.passed());

        report.artifacts.push(check(ArtifactStatus::Stale { embedded: None }));
        report.artifacts.push(check(ArtifactStatus::Missing));
        assert!(!report.hashes_match());
        assert!(!report.artifacts_present());
        assert!(report.markers_present());
        assert_eq!(report.failed_checks(), 2);
        assert_eq!(report.artifacts[1].file_name(), "property_defs.h");
    }

    #[test]
    fn test_empty_tree_reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let layout = Layout::default();
        std::fs::create_dir_all(root.join("metadata/properties")).unwrap();
        std::fs::create_dir_all(root.join("src/modules")).unwrap();
        std::fs::write(root.join(&layout.halo_properties), "halo_properties: []\n").unwrap();
        std::fs::write(root.join(&layout.galaxy_properties), "galaxy_properties: []\n").unwrap();

        let report = StalenessChecker::new(root, &layout).check(CheckStrategy::Hash);
        assert!(report.inputs_present());
        assert!(report.current_hash.is_some());
        assert!(!report.artifacts_present());
        assert_eq!(report.failed_checks(), 1);
    }

    proptest::proptest! {
        #[test]
        fn prop_every_header_style_yields_its_hash(
            input in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..64),
            style in 0usize..4,
            source_count in 0usize..4,
        ) {
            use crate::header::{render, CommentStyle, HeaderFields};

            let mut hasher = SourceHasher::new();
            hasher.update("halo_properties.yaml", &input);
            let hash = hasher.finish();
            let sources: Vec<String> = (0..source_count).map(|i| format!("in{i}.yaml")).collect();
            let style = [
                CommentStyle::CBlock,
                CommentStyle::Hash,
                CommentStyle::PythonDoc,
                CommentStyle::Html,
            ][style];
            let fields = HeaderFields { generated_on: "2025-01-01 00:00:00", sources: &sources, hash: &hash };
            let text = format!("{}int x;\n", render(style, &fields));
            proptest::prop_assert_eq!(extract_embedded_hash(&text), Some(hash));
            proptest::prop_assert!(has_marker(&text));
        }
    }

    #[test]
    fn test_missing_inputs_fail_first_check() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::default();
        let report = StalenessChecker::new(dir.path(), &layout).check(CheckStrategy::Mtime);
        assert!(!report.inputs_present());
        assert!(report.load_error.is_some());
        assert!(report.current_hash.is_none());
    }
}
