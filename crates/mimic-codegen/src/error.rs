//! Errors raised while emitting or writing artifacts.
//!
//! Emitters run on a validated model, so most of these indicate a validator
//! gap rather than bad input. They still abort generation before any file is
//! written.

use std::path::PathBuf;

use thiserror::Error;

use mimic_schema::{DependencyError, LoadError};

/// Failure to produce or write an artifact.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A property type has no entry in the type registry.
    #[error("property '{property}' has type '{kind}' with no registry entry")]
    UnknownType {
        /// Property name.
        property: String,
        /// Type spelling.
        kind: String,
    },

    /// A property's init or output source cannot be rendered.
    #[error("property '{property}': {reason}")]
    UnresolvedSource {
        /// Property name.
        property: String,
        /// What is missing.
        reason: String,
    },

    /// The module graph could not be ordered.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Inputs could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Writing or reading an artifact failed.
    #[error("io error at {path}: {source}")]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The validation manifest could not be serialized.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for emitter results.
pub type CodegenResult<T> = Result<T, CodegenError>;
