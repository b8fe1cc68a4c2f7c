//! # Module Definitions
//!
//! Typed form of a `module_info.yaml` `module:` mapping. Regular modules must
//! carry every descriptive field; utility modules (`is_utility: true`) only a
//! name, so most fields default to empty here and the validator decides which
//! absences are errors.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::property::{impl_spelled_enum, Scalar};

/// Capability names consumed and produced by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    /// Properties this module reads.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Properties this module computes.
    #[serde(default)]
    pub provides: Vec<String>,
}

/// Value type of a runtime parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// Floating point.
    Double,
    /// Integer.
    Int,
    /// Free text.
    Text,
    /// A spelling that matches no known parameter type.
    Unrecognized(String),
}

impl ParameterType {
    /// Map a YAML spelling onto a parameter type.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "double" => Self::Double,
            "int" => Self::Int,
            "string" => Self::Text,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Double => "double",
            Self::Int => "int",
            Self::Text => "string",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Double | Self::Int)
    }

    /// Whether `value` is an acceptable default for this type.
    ///
    /// Integers are accepted for `double`; nothing but integers for `int`.
    pub fn accepts(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Self::Int, Scalar::Int(_)) => true,
            (Self::Double, Scalar::Int(_) | Scalar::Float(_)) => true,
            (Self::Text, Scalar::Text(_)) => true,
            _ => false,
        }
    }
}

impl_spelled_enum!(ParameterType);

/// A runtime-configurable parameter of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Parameter name as it appears in the parameter file.
    pub name: String,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Default value, matching `kind`.
    pub default: Scalar,
    /// Human-readable description.
    pub description: String,
    /// Physical units, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Inclusive `[min, max]` for numeric parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<f64>>,
}

/// Either one path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestFiles {
    /// A single file.
    One(String),
    /// Several files.
    Many(Vec<String>),
}

impl TestFiles {
    /// The declared paths.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::One(path) => vec![path.as_str()],
            Self::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Test suite a declared test file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestKind {
    /// C unit tests.
    Unit,
    /// Pipeline integration tests.
    Integration,
    /// Scientific validation tests.
    Scientific,
}

impl TestKind {
    /// Every kind, in report order.
    pub const ALL: [TestKind; 3] = [Self::Unit, Self::Integration, Self::Scientific];

    /// Key in the `tests:` mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::Scientific => "scientific",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `tests:` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDeclarations {
    /// Unit test files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<TestFiles>,
    /// Integration test files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<TestFiles>,
    /// Scientific test files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific: Option<TestFiles>,
}

impl TestDeclarations {
    /// Declared files of one kind.
    pub fn get(&self, kind: TestKind) -> Option<&TestFiles> {
        match kind {
            TestKind::Unit => self.unit.as_ref(),
            TestKind::Integration => self.integration.as_ref(),
            TestKind::Scientific => self.scientific.as_ref(),
        }
    }
}

/// The `docs:` mapping. Paths are relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLinks {
    /// Physics description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<String>,
    /// User guide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_guide: Option<String>,
}

impl DocLinks {
    /// Declared links as `(label, path)` pairs.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        let mut links = Vec::new();
        if let Some(physics) = &self.physics {
            links.push(("physics", physics.as_str()));
        }
        if let Some(guide) = &self.user_guide {
            links.push(("user_guide", guide.as_str()));
        }
        links
    }
}

/// The `module:` mapping of a `module_info.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    /// Identifier; equals the module directory name.
    pub name: String,
    /// Human-readable title.
    #[serde(default)]
    pub display_name: String,
    /// One-paragraph summary.
    #[serde(default)]
    pub description: String,
    /// `MAJOR.MINOR.PATCH`.
    #[serde(default)]
    pub version: String,
    /// Maintainer.
    #[serde(default)]
    pub author: String,
    /// Reference documentation section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// C sources, relative to the module directory.
    #[serde(default)]
    pub sources: Vec<String>,
    /// C headers, relative to the module directory.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Registration entry point; must be `{name}_register`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_function: Option<String>,
    /// Capabilities consumed and produced.
    #[serde(default)]
    pub dependencies: Dependencies,
    /// Runtime parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    /// Declared test files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestDeclarations>,
    /// Declared documentation files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<DocLinks>,
    /// Literature references.
    #[serde(default)]
    pub references: Vec<String>,
    /// Build features the module needs (`HDF5`, `MPI`, `GSL`).
    #[serde(default)]
    pub compilation_requires: Vec<String>,
    /// Test-only helper module with reduced validation.
    #[serde(default)]
    pub is_utility: bool,
    /// Whether the module is enabled when the parameter file is silent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
}

impl ModuleDefinition {
    /// Registration symbol: the declared one, or the conventional
    /// `{name}_register`.
    pub fn register_symbol(&self) -> String {
        self.register_function
            .clone()
            .unwrap_or_else(|| format!("{}_register", self.name))
    }

    /// Reference documentation section.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("Uncategorized")
    }
}

/// A module definition together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedModule {
    /// Parsed `module:` mapping.
    pub definition: ModuleDefinition,
    /// Absolute module directory.
    pub dir: PathBuf,
    /// Module directory relative to the modules directory, e.g.
    /// `sage_infall` or `_system/test_fixture`.
    pub relative_dir: PathBuf,
    /// Path of the `module_info.yaml`.
    pub manifest: PathBuf,
}

impl LocatedModule {
    /// Module name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Final component of the module directory.
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Relative directory with forward slashes, for `#include` lines and
    /// make fragments.
    pub fn relative_dir_slashed(&self) -> String {
        crate::layout::slashed(&self.relative_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_type_accepts() {
        assert!(ParameterType::Int.accepts(&Scalar::Int(3)));
        assert!(!ParameterType::Int.accepts(&Scalar::Float(0.5)));
        assert!(ParameterType::Double.accepts(&Scalar::Int(1)));
        assert!(ParameterType::Double.accepts(&Scalar::Float(0.5)));
        assert!(!ParameterType::Double.accepts(&Scalar::Text("x".into())));
        assert!(ParameterType::Text.accepts(&Scalar::Text("x".into())));
        assert!(!ParameterType::Text.accepts(&Scalar::Bool(true)));
    }

    #[test]
    fn test_utility_module_needs_only_name() {
        let module: ModuleDefinition = serde_json::from_value(json!({
            "name": "test_fixture",
            "is_utility": true
        }))
        .unwrap();
        assert!(module.is_utility);
        assert!(module.sources.is_empty());
        assert_eq!(module.register_symbol(), "test_fixture_register");
    }

    #[test]
    fn test_test_files_one_or_many() {
        let tests: TestDeclarations = serde_json::from_value(json!({
            "unit": "test_unit_cooling.c",
            "integration": ["a.py", "b.py"]
        }))
        .unwrap();
        assert_eq!(tests.get(TestKind::Unit).unwrap().paths(), vec!["test_unit_cooling.c"]);
        assert_eq!(
            tests.get(TestKind::Integration).unwrap().paths(),
            vec!["a.py", "b.py"]
        );
        assert!(tests.get(TestKind::Scientific).is_none());
    }

    #[test]
    fn test_relative_dir_slashed() {
        let module = LocatedModule {
            definition: serde_json::from_value(json!({"name": "test_fixture"})).unwrap(),
            dir: PathBuf::from("/repo/src/modules/_system/test_fixture"),
            relative_dir: PathBuf::from("_system").join("test_fixture"),
            manifest: PathBuf::from("/repo/src/modules/_system/test_fixture/module_info.yaml"),
        };
        assert_eq!(module.relative_dir_slashed(), "_system/test_fixture");
        assert_eq!(module.dir_name(), "test_fixture");
    }
}
