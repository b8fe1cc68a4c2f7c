//! # Structural Schemas
//!
//! JSON Schema (Draft 2020-12) documents describing the *shape* of property
//! entries and module mappings: required keys, strings vs. lists vs. objects.
//! They are compiled into the binary and checked before any typed
//! deserialization, so a shape problem is reported with the JSON pointer of
//! the offending field.
//!
//! Value rules (enumerations, naming, ranges) are not expressed here. They
//! live in [`crate::validate`] where they can carry their own error class.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::SchemaBuildError;

const PROPERTY_SCHEMA: &str = include_str!("schemas/property.schema.json");
const MODULE_SCHEMA: &str = include_str!("schemas/module.schema.json");
const UTILITY_MODULE_SCHEMA: &str = include_str!("schemas/utility_module.schema.json");

/// Which structural schema to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// One entry of a property list.
    Property,
    /// A regular `module:` mapping.
    Module,
    /// A `module:` mapping with `is_utility: true`.
    UtilityModule,
}

impl DocumentKind {
    fn schema_name(self) -> &'static str {
        match self {
            Self::Property => "property.schema.json",
            Self::Module => "module.schema.json",
            Self::UtilityModule => "utility_module.schema.json",
        }
    }
}

/// One structural violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the document, empty for the root.
    pub instance_path: String,
    /// Validator message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// The three compiled structural schemas.
pub struct StructuralSchemas {
    property: Validator,
    module: Validator,
    utility_module: Validator,
}

impl fmt::Debug for StructuralSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralSchemas").finish_non_exhaustive()
    }
}

impl StructuralSchemas {
    /// Compile the embedded schemas.
    pub fn compile() -> Result<Self, SchemaBuildError> {
        Ok(Self {
            property: build(DocumentKind::Property, PROPERTY_SCHEMA)?,
            module: build(DocumentKind::Module, MODULE_SCHEMA)?,
            utility_module: build(DocumentKind::UtilityModule, UTILITY_MODULE_SCHEMA)?,
        })
    }

    /// Every violation of `instance` against the schema for `kind`.
    pub fn violations(&self, kind: DocumentKind, instance: &Value) -> Vec<Violation> {
        let validator = match kind {
            DocumentKind::Property => &self.property,
            DocumentKind::Module => &self.module,
            DocumentKind::UtilityModule => &self.utility_module,
        };
        validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

fn build(kind: DocumentKind, source: &str) -> Result<Validator, SchemaBuildError> {
    let schema: Value =
        serde_json::from_str(source).map_err(|e| SchemaBuildError {
            schema_name: kind.schema_name().to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.build(&schema).map_err(|e| SchemaBuildError {
        schema_name: kind.schema_name().to_string(),
        reason: e.to_string(),
    })
}
