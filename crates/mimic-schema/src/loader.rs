//! # Metadata Loader
//!
//! Reads the property files and every discovered `module_info.yaml` into
//! JSON value trees, and hashes the raw bytes of all of them into one
//! [`SourceHash`].
//!
//! Documents stay as `serde_json::Value` here. The validator runs the
//! structural schemas over these trees before deserializing them into typed
//! records, so a malformed entry becomes a diagnostic rather than a load
//! failure. Only unreadable or unparseable files are `LoadError`s.
//!
//! ## Module discovery
//!
//! Entries of the modules directory are visited in sorted order. Names
//! starting with `_` are internal and skipped, except `_system`, from which
//! only `_system/test_fixture` is taken. A directory without a
//! `module_info.yaml` is skipped silently.

use std::path::{Path, PathBuf};

use serde_json::Value;

use mimic_core::layout::slashed;
use mimic_core::{Layout, PropertyCategory, SourceHash, SourceHasher};

use crate::error::{LoadError, LoadResult};

/// Directory prefix marking internal module trees.
const INTERNAL_PREFIX: char = '_';
/// The one internal tree scanned for modules.
const SYSTEM_DIR: &str = "_system";
/// The one module taken from [`SYSTEM_DIR`].
const TEST_FIXTURE_DIR: &str = "test_fixture";
/// Manifest file name inside a module directory.
pub const MODULE_MANIFEST: &str = "module_info.yaml";

/// One parsed property file.
#[derive(Debug, Clone)]
pub struct RawPropertyFile {
    /// Which file this is.
    pub category: PropertyCategory,
    /// Absolute path.
    pub path: PathBuf,
    /// The list under the category key, or `None` when the key is missing
    /// or not a list.
    pub entries: Option<Vec<Value>>,
}

/// One parsed module manifest.
#[derive(Debug, Clone)]
pub struct RawModule {
    /// Absolute module directory.
    pub dir: PathBuf,
    /// Directory relative to the modules directory.
    pub relative_dir: PathBuf,
    /// Absolute manifest path.
    pub manifest: PathBuf,
    /// The `module:` mapping, or `None` when the key is absent or null.
    pub body: Option<Value>,
}

impl RawModule {
    /// Final component of the module directory.
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Everything read from disk for one run.
#[derive(Debug, Clone)]
pub struct SpecSet {
    /// Repository root all paths are resolved against.
    pub root: PathBuf,
    /// Halo property file.
    pub halo: RawPropertyFile,
    /// Galaxy property file.
    pub galaxy: RawPropertyFile,
    /// Discovered modules in discovery order.
    pub modules: Vec<RawModule>,
    /// Hash over every input, in load order.
    pub source_hash: SourceHash,
}

impl SpecSet {
    /// Every input file, in hash order.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.halo.path.clone(), self.galaxy.path.clone()];
        paths.extend(self.modules.iter().map(|m| m.manifest.clone()));
        paths
    }
}

/// Reads metadata according to a [`Layout`].
#[derive(Debug, Clone)]
pub struct SpecLoader<'a> {
    root: &'a Path,
    layout: &'a Layout,
}

impl<'a> SpecLoader<'a> {
    /// Loader for the repository at `root`.
    pub fn new(root: &'a Path, layout: &'a Layout) -> Self {
        Self { root, layout }
    }

    /// Absolute modules directory.
    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(&self.layout.modules_dir)
    }

    /// Load both property files and every discovered module.
    pub fn load(&self) -> LoadResult<SpecSet> {
        let module_dirs = self.discover_modules()?;
        self.load_with_modules(&module_dirs)
    }

    /// Load both property files and the single module in `dir`.
    ///
    /// A missing manifest here is an error: the caller asked for this module
    /// explicitly.
    pub fn load_single(&self, dir: &Path) -> LoadResult<SpecSet> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };
        let manifest = dir.join(MODULE_MANIFEST);
        if !manifest.is_file() {
            return Err(LoadError::FileNotFound { path: manifest });
        }
        self.load_with_modules(&[dir])
    }

    /// Module directories that contain a manifest, in discovery order.
    pub fn discover_modules(&self) -> LoadResult<Vec<PathBuf>> {
        let modules_dir = self.modules_dir();
        if !modules_dir.is_dir() {
            return Err(LoadError::ModulesDirMissing { path: modules_dir });
        }

        let mut found = Vec::new();
        for entry in sorted_entries(&modules_dir)? {
            let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !entry.is_dir() {
                continue;
            }
            let candidate = if name == SYSTEM_DIR {
                entry.join(TEST_FIXTURE_DIR)
            } else if name.starts_with(INTERNAL_PREFIX) {
                tracing::trace!(dir = %name, "skipping internal directory");
                continue;
            } else {
                entry
            };

            if candidate.join(MODULE_MANIFEST).is_file() {
                found.push(candidate);
            } else {
                tracing::debug!(dir = %candidate.display(), "no module_info.yaml, skipping");
            }
        }
        Ok(found)
    }

    fn load_with_modules(&self, module_dirs: &[PathBuf]) -> LoadResult<SpecSet> {
        let mut hasher = SourceHasher::new();
        let halo = self.load_property_file(PropertyCategory::Halo, &mut hasher)?;
        let galaxy = self.load_property_file(PropertyCategory::Galaxy, &mut hasher)?;

        let modules_dir = self.modules_dir();
        let mut modules = Vec::with_capacity(module_dirs.len());
        for dir in module_dirs {
            let manifest = dir.join(MODULE_MANIFEST);
            let document = self.read_document(&manifest, &mut hasher)?;
            let body = match document.get("module") {
                Some(Value::Null) | None => None,
                Some(body) => Some(body.clone()),
            };
            let relative_dir = dir
                .strip_prefix(&modules_dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(dir.file_name().unwrap_or_default()));
            modules.push(RawModule {
                dir: dir.clone(),
                relative_dir,
                manifest,
                body,
            });
        }

        tracing::debug!(
            inputs = hasher.input_count(),
            modules = modules.len(),
            "loaded metadata"
        );

        Ok(SpecSet {
            root: self.root.to_path_buf(),
            halo,
            galaxy,
            modules,
            source_hash: hasher.finish(),
        })
    }

    fn load_property_file(
        &self,
        category: PropertyCategory,
        hasher: &mut SourceHasher,
    ) -> LoadResult<RawPropertyFile> {
        let relative = match category {
            PropertyCategory::Halo => &self.layout.halo_properties,
            PropertyCategory::Galaxy => &self.layout.galaxy_properties,
        };
        let path = self.root.join(relative);
        let document = self.read_document(&path, hasher)?;
        let entries = match document.get(category.yaml_key()) {
            Some(Value::Array(items)) => Some(items.clone()),
            _ => None,
        };
        Ok(RawPropertyFile {
            category,
            path,
            entries,
        })
    }

    /// Read, hash and parse one YAML file.
    fn read_document(&self, path: &Path, hasher: &mut SourceHasher) -> LoadResult<Value> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        hasher.update(&self.label(path), &bytes);
        parse_yaml(path, &bytes)
    }

    /// Repository-relative label of an input, used in the hash.
    fn label(&self, path: &Path) -> String {
        path.strip_prefix(self.root)
            .map(slashed)
            .unwrap_or_else(|_| path.display().to_string())
    }
}

/// Parse YAML bytes into a JSON value tree. An empty document is `null`.
pub fn parse_yaml(path: &Path, bytes: &[u8]) -> LoadResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_yaml::from_slice(bytes).map_err(|source| LoadError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}

fn sorted_entries(dir: &Path) -> LoadResult<Vec<PathBuf>> {
    let read = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn scaffold(root: &Path) {
        write(
            root,
            "metadata/properties/halo_properties.yaml",
            "halo_properties:\n  - name: Mvir\n    type: float\n    units: x\n    description: d\n    output: true\n",
        );
        write(
            root,
            "metadata/properties/galaxy_properties.yaml",
            "galaxy_properties: []\n",
        );
        std::fs::create_dir_all(root.join("src/modules")).unwrap();
    }

    #[test]
    fn test_discovery_rules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        write(root, "src/modules/zeta/module_info.yaml", "module:\n  name: zeta\n");
        write(root, "src/modules/alpha/module_info.yaml", "module:\n  name: alpha\n");
        write(root, "src/modules/_template/module_info.yaml", "module:\n  name: t\n");
        write(root, "src/modules/_system/test_fixture/module_info.yaml", "module:\n  name: test_fixture\n");
        write(root, "src/modules/_system/other/module_info.yaml", "module:\n  name: other\n");
        std::fs::create_dir_all(root.join("src/modules/shared")).unwrap();
        write(root, "src/modules/README.md", "not a module\n");

        let layout = Layout::default();
        let loader = SpecLoader::new(root, &layout);
        let names: Vec<String> = loader
            .discover_modules()
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(root.join("src/modules")).unwrap().display().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "_system/test_fixture".to_string(),
                "alpha".to_string(),
                "zeta".to_string()
            ]
        );
    }

    #[test]
    fn test_load_reads_entries_and_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        write(root, "src/modules/alpha/module_info.yaml", "module:\n  name: alpha\n");
        write(root, "src/modules/empty/module_info.yaml", "other: 1\n");

        let layout = Layout::default();
        let specs = SpecLoader::new(root, &layout).load().unwrap();
        assert_eq!(specs.halo.entries.as_ref().unwrap().len(), 1);
        assert_eq!(specs.galaxy.entries.as_ref().unwrap().len(), 0);
        assert_eq!(specs.modules.len(), 2);
        assert!(specs.modules[0].body.is_some());
        assert!(specs.modules[1].body.is_none());
        assert_eq!(specs.input_paths().len(), 4);
    }

    #[test]
    fn test_unparseable_yaml_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        write(root, "src/modules/broken/module_info.yaml", "module: [unclosed\n");

        let layout = Layout::default();
        let err = SpecLoader::new(root, &layout).load().unwrap_err();
        assert!(matches!(err, LoadError::YamlParse { .. }));
    }

    #[test]
    fn test_missing_property_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/modules")).unwrap();
        let layout = Layout::default();
        let err = SpecLoader::new(dir.path(), &layout).load().unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_category_key_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        write(root, "metadata/properties/galaxy_properties.yaml", "galaxies: []\n");
        let layout = Layout::default();
        let specs = SpecLoader::new(root, &layout).load().unwrap();
        assert!(specs.galaxy.entries.is_none());
    }

    #[test]
    fn test_hash_changes_with_module_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        write(root, "src/modules/alpha/module_info.yaml", "module:\n  name: alpha\n");
        let layout = Layout::default();
        let before = SpecLoader::new(root, &layout).load().unwrap().source_hash;

        write(root, "src/modules/alpha/module_info.yaml", "module:\n  name: alphb\n");
        let after = SpecLoader::new(root, &layout).load().unwrap().source_hash;
        assert_ne!(before, after);
    }

    #[test]
    fn test_load_single_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        scaffold(root);
        std::fs::create_dir_all(root.join("src/modules/ghost")).unwrap();
        let layout = Layout::default();
        let err = SpecLoader::new(root, &layout)
            .load_single(Path::new("src/modules/ghost"))
            .unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
