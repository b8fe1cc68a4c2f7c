//! # Repository Layout
//!
//! Where the generator reads its inputs and writes its artifacts, relative to
//! the repository root. Every field has a default matching the standard Mimic
//! tree, so a config file only needs to name what differs:
//!
//! ```yaml
//! modules_dir: physics/modules
//! module_reference: docs/modules.md
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up at the repository root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mimicgen.yaml";

/// Input and output paths, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Halo property file.
    pub halo_properties: PathBuf,
    /// Galaxy property file.
    pub galaxy_properties: PathBuf,
    /// Directory scanned for `<name>/module_info.yaml`.
    pub modules_dir: PathBuf,
    /// C source root; make fragment entries are `$(SRC_DIR)/...` under it.
    pub src_dir: PathBuf,
    /// Module registry implementation, relative to `src_dir`.
    pub registry_source: PathBuf,
    /// Shared directory for declared unit tests.
    pub unit_tests_dir: PathBuf,
    /// Generated C headers and include fragments.
    pub include_dir: PathBuf,
    /// Generated Python data-layout bindings.
    pub bindings_dir: PathBuf,
    /// Generated test inputs (make fragment, validation manifest).
    pub tests_generated_dir: PathBuf,
    /// Generated module registration source.
    pub module_init: PathBuf,
    /// Generated module reference documentation.
    pub module_reference: PathBuf,
    /// Hash-tracking file.
    pub hash_file: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            halo_properties: PathBuf::from("metadata/properties/halo_properties.yaml"),
            galaxy_properties: PathBuf::from("metadata/properties/galaxy_properties.yaml"),
            modules_dir: PathBuf::from("src/modules"),
            src_dir: PathBuf::from("src"),
            registry_source: PathBuf::from("core/module_registry.c"),
            unit_tests_dir: PathBuf::from("tests/unit"),
            include_dir: PathBuf::from("src/include/generated"),
            bindings_dir: PathBuf::from("output/mimic-plot/generated"),
            tests_generated_dir: PathBuf::from("tests/generated"),
            module_init: PathBuf::from("src/modules/_system/generated/module_init.c"),
            module_reference: PathBuf::from("docs/user/module-reference.md"),
            hash_file: PathBuf::from("build/module_registry_hash.txt"),
        }
    }
}

impl Layout {
    /// Load a layout from a YAML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `<root>/mimicgen.yaml` if it exists,
    /// else the defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = root.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }

    /// Registry source as it appears in the make fragment.
    pub fn registry_source_slashed(&self) -> String {
        slashed(&self.registry_source)
    }

    /// Modules directory relative to `src_dir`, for make fragment entries.
    /// Falls back to the full relative path when it is not under `src_dir`.
    pub fn modules_dir_under_src(&self) -> String {
        let relative = self
            .modules_dir
            .strip_prefix(&self.src_dir)
            .unwrap_or(&self.modules_dir);
        slashed(relative)
    }

    /// Registration source relative to `src_dir`, for the make fragment.
    pub fn module_init_under_src(&self) -> String {
        let relative = self
            .module_init
            .strip_prefix(&self.src_dir)
            .unwrap_or(&self.module_init);
        slashed(relative)
    }
}

/// Render a relative path with forward slashes.
pub fn slashed(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
