//! # mimic-core — Foundational Types for the Mimic Generator
//!
//! This crate holds the data model every other crate in the workspace reads:
//! property and module definitions deserialized from YAML, the constant
//! registries that map property types onto C, NumPy and HDF5 spellings, the
//! diagnostics taxonomy used by validation, the source-hash digest embedded in
//! generated artifacts, and the repository layout configuration.
//!
//! ## Key Design Principles
//!
//! 1. **Typed records, not dictionaries.** `PropertyDefinition` and
//!    `ModuleDefinition` are plain serde structs. Enumerated fields keep an
//!    `Unrecognized` variant so a bad spelling becomes a diagnostic instead of
//!    a deserialization failure that hides every other finding.
//!
//! 2. **Registries are values.** `TypeRegistry` and `SchemaTables` are built
//!    once and passed into the validator and emitters. Nothing is a global.
//!
//! 3. **Diagnostics are data.** Validation never returns `Err` for a rule
//!    violation; it appends to a `DiagnosticsReport` that the binary converts
//!    into an exit code.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mimic-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

#![deny(missing_docs)]

pub mod diagnostic;
pub mod digest;
pub mod error;
pub mod ident;
pub mod layout;
pub mod module;
pub mod property;
pub mod registry;

pub use diagnostic::{Diagnostic, DiagnosticsReport, ErrorClass, Severity};
pub use digest::{SourceHash, SourceHasher};
pub use error::ConfigError;
pub use layout::Layout;
pub use module::{
    Dependencies, DocLinks, LocatedModule, ModuleDefinition, ParameterDefinition, ParameterType,
    TestDeclarations, TestFiles, TestKind,
};
pub use property::{
    InitSource, OutputSource, PropertyCategory, PropertyDefinition, PropertySet, PropertyType,
    Scalar,
};
pub use registry::{SchemaTables, TypeInfo, TypeRegistry};
