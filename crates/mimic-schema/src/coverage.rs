//! Declared-test coverage.
//!
//! Answers one question per module: do the test files named in
//! `module_info.yaml` exist? Unlike the validator this runs on manifests that
//! may not pass validation, so a module whose mapping cannot be read is
//! recorded as such rather than aborting the whole check.

use std::path::{Path, PathBuf};

use mimic_core::{Layout, ModuleDefinition, TestKind};

use crate::loader::RawModule;
use crate::validate::locate_test_file;

/// One declared test file and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredTest {
    /// Test kind it was declared under.
    pub kind: TestKind,
    /// Path as written in the manifest.
    pub file: String,
    /// Resolved location, `None` if missing.
    pub found_at: Option<PathBuf>,
    /// Where a missing file was expected.
    pub expected_at: PathBuf,
}

impl DeclaredTest {
    /// Whether the file exists.
    pub fn exists(&self) -> bool {
        self.found_at.is_some()
    }
}

/// Coverage of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCoverage {
    /// Module directory name.
    pub module: String,
    /// Every declared test file.
    pub declared: Vec<DeclaredTest>,
    /// Kinds with no declaration at all.
    pub undeclared: Vec<TestKind>,
    /// Why the manifest could not be read, if it could not.
    pub unreadable: Option<String>,
}

/// Coverage of every discovered module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCoverageReport {
    /// Per-module results in discovery order.
    pub modules: Vec<ModuleCoverage>,
}

impl TestCoverageReport {
    /// Modules whose manifest could be read.
    pub fn modules_checked(&self) -> usize {
        self.modules.iter().filter(|m| m.unreadable.is_none()).count()
    }

    /// Declared tests that exist.
    pub fn tests_found(&self) -> usize {
        self.all_declared().filter(|(_, t)| t.exists()).count()
    }

    /// Declared tests that do not exist, with their module.
    pub fn missing(&self) -> impl Iterator<Item = (&str, &DeclaredTest)> {
        self.all_declared().filter(|(_, t)| !t.exists())
    }

    /// Whether every manifest was readable and every declared test exists.
    pub fn passed(&self) -> bool {
        self.modules.iter().all(|m| m.unreadable.is_none()) && self.missing().next().is_none()
    }

    fn all_declared(&self) -> impl Iterator<Item = (&str, &DeclaredTest)> {
        self.modules
            .iter()
            .flat_map(|m| m.declared.iter().map(move |t| (m.module.as_str(), t)))
    }
}

/// Check every declared test of `modules`.
pub fn check_declared_tests(modules: &[RawModule], root: &Path, layout: &Layout) -> TestCoverageReport {
    let modules = modules
        .iter()
        .map(|raw| module_coverage(raw, root, layout))
        .collect();
    TestCoverageReport { modules }
}

fn module_coverage(raw: &RawModule, root: &Path, layout: &Layout) -> ModuleCoverage {
    let mut coverage = ModuleCoverage {
        module: raw.dir_name(),
        declared: Vec::new(),
        undeclared: Vec::new(),
        unreadable: None,
    };

    let definition = match &raw.body {
        None => Err("no 'module' mapping".to_string()),
        Some(body) => serde_json::from_value::<ModuleDefinition>(body.clone()).map_err(|e| e.to_string()),
    };
    let definition = match definition {
        Ok(definition) => definition,
        Err(reason) => {
            tracing::warn!(module = %coverage.module, %reason, "manifest unreadable");
            coverage.unreadable = Some(reason);
            return coverage;
        }
    };

    let tests = definition.tests.unwrap_or_default();
    for kind in TestKind::ALL {
        let Some(files) = tests.get(kind) else {
            coverage.undeclared.push(kind);
            continue;
        };
        for file in files.paths() {
            coverage.declared.push(DeclaredTest {
                kind,
                file: file.to_string(),
                found_at: locate_test_file(kind, file, &raw.dir, root, layout),
                expected_at: raw.dir.join(file),
            });
        }
    }
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SpecLoader;

    fn repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("metadata/properties")).unwrap();
        std::fs::write(
            root.join("metadata/properties/halo_properties.yaml"),
            "halo_properties: []\n",
        )
        .unwrap();
        std::fs::write(
            root.join("metadata/properties/galaxy_properties.yaml"),
            "galaxy_properties: []\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.join("src/modules/cooling")).unwrap();
        std::fs::create_dir_all(root.join("tests/unit")).unwrap();
        dir
    }

    fn coverage(root: &Path) -> TestCoverageReport {
        let layout = Layout::default();
        let specs = SpecLoader::new(root, &layout).load().unwrap();
        check_declared_tests(&specs.modules, root, &layout)
    }

    #[test]
    fn test_found_missing_and_undeclared() {
        let dir = repo();
        let root = dir.path();
        std::fs::write(
            root.join("src/modules/cooling/module_info.yaml"),
            "module:\n  name: cooling\n  tests:\n    unit: test_unit_cooling.c\n    integration: [test_integration_cooling.py]\n",
        )
        .unwrap();
        std::fs::write(root.join("tests/unit/test_unit_cooling.c"), "").unwrap();

        let report = coverage(root);
        assert_eq!(report.modules_checked(), 1);
        assert_eq!(report.tests_found(), 1);
        let missing: Vec<_> = report.missing().map(|(m, t)| (m, t.file.as_str())).collect();
        assert_eq!(missing, vec![("cooling", "test_integration_cooling.py")]);
        assert_eq!(report.modules[0].undeclared, vec![TestKind::Scientific]);
        assert!(!report.passed());
    }

    #[test]
    fn test_all_present_passes() {
        let dir = repo();
        let root = dir.path();
        std::fs::write(
            root.join("src/modules/cooling/module_info.yaml"),
            "module:\n  name: cooling\n  tests:\n    scientific: test_scientific_cooling.py\n",
        )
        .unwrap();
        std::fs::write(root.join("src/modules/cooling/test_scientific_cooling.py"), "").unwrap();
        assert!(coverage(root).passed());
    }

    #[test]
    fn test_unreadable_manifest_fails() {
        let dir = repo();
        let root = dir.path();
        std::fs::write(root.join("src/modules/cooling/module_info.yaml"), "other: 1\n").unwrap();
        let report = coverage(root);
        assert_eq!(report.modules_checked(), 0);
        assert!(report.modules[0].unreadable.is_some());
        assert!(!report.passed());
    }
}
