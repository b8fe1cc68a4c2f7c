//! # mimic-schema — Loading, Validation & Dependency Resolution
//!
//! Turns the YAML metadata of a Mimic checkout into a validated, ordered
//! model that the emitters can trust.
//!
//! ## Loading (`loader`)
//!
//! [`SpecLoader`] reads `halo_properties.yaml`, `galaxy_properties.yaml`, and
//! every discovered `module_info.yaml` into JSON value trees, hashing the raw
//! bytes of each into the [`SourceHash`](mimic_core::SourceHash) embedded in
//! every generated artifact.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator::validate`] runs the embedded JSON Schemas
//! ([`structure`]) and then the value rules over every document, collecting
//! all findings into a [`DiagnosticsReport`](mimic_core::DiagnosticsReport).
//! The model is only handed out when no error was recorded.
//!
//! ## Resolution (`resolve`)
//!
//! [`resolve_order`] sorts modules so that every provider of a capability
//! precedes its consumers. Ties are broken by name, so the order never
//! depends on directory listing order.
//!
//! ## Crate Policy
//!
//! - Depends only on `mimic-core` internally.
//! - A rule violation is a diagnostic, never an `Err`. Only unreadable
//!   input and broken embedded schemas are errors.

pub mod coverage;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod structure;
pub mod validate;

pub use coverage::{check_declared_tests, DeclaredTest, ModuleCoverage, TestCoverageReport};
pub use error::{LoadError, LoadResult, SchemaBuildError};
pub use loader::{parse_yaml, RawModule, RawPropertyFile, SpecLoader, SpecSet, MODULE_MANIFEST};
pub use resolve::{check_capabilities, resolve_order, DependencyError, DependencyGraph};
pub use structure::{DocumentKind, StructuralSchemas, Violation};
pub use validate::{SchemaValidator, ValidatedModel, Validation, GLOBAL_ENTITY};
