//! # Constant Registries
//!
//! Lookup tables the validator and emitters consult: how each property type
//! is spelled in C, NumPy and HDF5, and which build features a module may ask
//! for. The standard tables are built by `standard()` and passed explicitly to
//! whoever needs them; tests construct narrowed tables to exercise the
//! unknown-entry paths.

use std::collections::{BTreeMap, BTreeSet};

use crate::property::PropertyType;

/// How one property type is rendered in each target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// C element type.
    pub c_type: &'static str,
    /// Fixed element count for vector types.
    pub array_len: Option<usize>,
    /// NumPy dtype expression.
    pub numpy_type: &'static str,
    /// HDF5 type tag used in the field table.
    pub h5_type: &'static str,
}

impl TypeInfo {
    /// Whether the type is a fixed-length vector.
    pub fn is_vector(&self) -> bool {
        self.array_len.is_some()
    }

    /// C array suffix, e.g. `[3]`, or empty for scalars.
    pub fn c_array_suffix(&self) -> String {
        self.array_len.map(|n| format!("[{n}]")).unwrap_or_default()
    }
}

/// Property type → rendering table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    entries: BTreeMap<PropertyType, TypeInfo>,
}

impl TypeRegistry {
    /// The table every generated artifact is built against.
    pub fn standard() -> Self {
        let entries = [
            (PropertyType::Int, TypeInfo {
                c_type: "int",
                array_len: None,
                numpy_type: "np.int32",
                h5_type: "H5T_NATIVE_INT",
            }),
            (PropertyType::Float, TypeInfo {
                c_type: "float",
                array_len: None,
                numpy_type: "np.float32",
                h5_type: "H5T_NATIVE_FLOAT",
            }),
            (PropertyType::Double, TypeInfo {
                c_type: "double",
                array_len: None,
                numpy_type: "np.float64",
                h5_type: "H5T_NATIVE_DOUBLE",
            }),
            (PropertyType::LongLong, TypeInfo {
                c_type: "long long",
                array_len: None,
                numpy_type: "np.int64",
                h5_type: "H5T_NATIVE_LLONG",
            }),
            (PropertyType::Vec3Float, TypeInfo {
                c_type: "float",
                array_len: Some(3),
                numpy_type: "(np.float32, 3)",
                h5_type: "array3f_tid",
            }),
            (PropertyType::Vec3Int, TypeInfo {
                c_type: "int",
                array_len: Some(3),
                numpy_type: "(np.int32, 3)",
                h5_type: "array3i_tid",
            }),
        ];
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// An empty registry. Mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace one entry.
    pub fn with(mut self, kind: PropertyType, info: TypeInfo) -> Self {
        self.entries.insert(kind, info);
        self
    }

    /// Rendering of `kind`, if registered.
    pub fn get(&self, kind: &PropertyType) -> Option<&TypeInfo> {
        self.entries.get(kind)
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: &PropertyType) -> bool {
        self.entries.contains_key(kind)
    }

    /// Registered type spellings, for error messages.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(PropertyType::as_str).collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Everything the validator needs beyond the documents themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTables {
    /// Property type renderings.
    pub types: TypeRegistry,
    /// Accepted `compilation_requires` entries.
    pub compilation_features: BTreeSet<String>,
}

impl SchemaTables {
    /// Standard type table and the `HDF5`, `MPI`, `GSL` feature flags.
    pub fn standard() -> Self {
        Self {
            types: TypeRegistry::standard(),
            compilation_features: ["HDF5", "MPI", "GSL"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Whether a `compilation_requires` entry is recognised.
    pub fn is_known_feature(&self, feature: &str) -> bool {
        self.compilation_features.contains(feature)
    }
}

impl Default for SchemaTables {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_type() {
        let registry = TypeRegistry::standard();
        for kind in PropertyType::ALL {
            assert!(registry.contains(&kind), "missing {kind}");
        }
        assert!(!registry.contains(&PropertyType::Unrecognized("quad".into())));
    }

    #[test]
    fn test_vector_types_have_length_three() {
        let registry = TypeRegistry::standard();
        let info = registry.get(&PropertyType::Vec3Float).unwrap();
        assert!(info.is_vector());
        assert_eq!(info.c_array_suffix(), "[3]");
        assert_eq!(info.h5_type, "array3f_tid");
        assert_eq!(registry.get(&PropertyType::Int).unwrap().c_array_suffix(), "");
    }

    #[test]
    fn test_narrowed_registry() {
        let registry = TypeRegistry::empty().with(
            PropertyType::Double,
            TypeInfo {
                c_type: "double",
                array_len: None,
                numpy_type: "np.float64",
                h5_type: "H5T_NATIVE_DOUBLE",
            },
        );
        assert_eq!(registry.names(), vec!["double"]);
        assert!(!registry.contains(&PropertyType::Float));
    }

    #[test]
    fn test_feature_flags() {
        let tables = SchemaTables::standard();
        assert!(tables.is_known_feature("HDF5"));
        assert!(tables.is_known_feature("GSL"));
        assert!(!tables.is_known_feature("CUDA"));
    }
}
