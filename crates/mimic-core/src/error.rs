//! # Error Types
//!
//! Errors raised by this crate. Validation findings are not errors; see
//! [`crate::diagnostic`].

use std::path::PathBuf;

use thiserror::Error;

/// The layout configuration file could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for a [`crate::Layout`].
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}
