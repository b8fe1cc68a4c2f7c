//! Error types for loading metadata.

use std::path::PathBuf;

use thiserror::Error;

/// An input file could not be turned into a document.
///
/// These abort the run. Problems *inside* a parsed document are diagnostics,
/// not `LoadError`s.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// The modules directory does not exist.
    #[error("modules directory not found: {path}")]
    ModulesDirMissing {
        /// Expected directory.
        path: PathBuf,
    },

    /// A file exists but is not valid YAML.
    #[error("YAML parse error in {path}: {source}")]
    YamlParse {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        source: serde_yaml::Error,
    },

    /// Reading a file or directory failed.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Convenience alias for loader results.
pub type LoadResult<T> = Result<T, LoadError>;

/// An embedded structural schema failed to compile.
#[derive(Error, Debug)]
#[error("schema build error for '{schema_name}': {reason}")]
pub struct SchemaBuildError {
    /// Schema file name.
    pub schema_name: String,
    /// Compiler message.
    pub reason: String,
}
