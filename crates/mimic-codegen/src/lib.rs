//! # mimic-codegen — Artifact Emitters and Staleness Checks
//!
//! Renders a [`ValidatedModel`](mimic_schema::ValidatedModel) into the fixed
//! set of generated files and checks an existing tree against its inputs.
//!
//! ## Emission
//!
//! Every emitter is a pure function from an [`EmitContext`] to the full text
//! of one artifact. [`emit_all`] renders the whole set in memory; nothing is
//! written until every emitter has succeeded. [`write_all`] then writes the
//! files one by one.
//!
//! | Artifact | Emitter |
//! |----------|---------|
//! | `property_defs.h` | [`structs`] |
//! | `init_halo_properties.inc`, `init_galaxy_properties.inc` | [`init`] |
//! | `copy_to_output.inc` | [`output`] |
//! | `hdf5_field_count.inc`, `hdf5_field_definitions.inc` | [`fields`] |
//! | `dtype.py`, `__init__.py` | [`bindings`] |
//! | `module_init.c` | [`registration`] |
//! | `module_sources.mk` | [`makefrag`] |
//! | `module-reference.md` | [`docs`] |
//! | `property_ranges.json` | [`manifest`] |
//! | `module_registry_hash.txt` | [`stamp`] |
//!
//! Each artifact opens with the header from [`header`], which embeds the
//! source hash. Apart from the `Generated on:` timestamp, output is a pure
//! function of the inputs.
//!
//! ## Staleness
//!
//! [`StalenessChecker`] reads the embedded hashes back and compares them with
//! the hash of the current inputs, without regenerating anything.

pub mod artifact;
pub mod bindings;
pub mod context;
pub mod docs;
pub mod error;
pub mod fields;
pub mod header;
pub mod init;
pub mod makefrag;
pub mod manifest;
pub mod output;
pub mod registration;
pub mod shapes;
pub mod stamp;
pub mod staleness;
pub mod structs;

pub use artifact::{emit_all, is_current, write_all, ArtifactKind, GeneratedArtifact};
pub use context::EmitContext;
pub use error::{CodegenError, CodegenResult};
pub use header::CommentStyle;
pub use staleness::{
    extract_embedded_hash, has_marker, ArtifactCheck, ArtifactStatus, CheckStrategy, InputStatus,
    StalenessChecker, StalenessReport,
};
