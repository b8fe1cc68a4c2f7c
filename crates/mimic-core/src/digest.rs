//! # Source Hash
//!
//! A single SHA-256 over every input file, embedded in every generated
//! artifact so that staleness can be detected by comparing text.
//!
//! Each input contributes its repository-relative label, a NUL, its raw
//! bytes and another NUL, in the order the loader feeds them (halo file,
//! galaxy file, then module manifests in discovery order). Relabeling or
//! reordering inputs therefore changes the hash, as does any byte flip.
//!
//! The hash is a change detector. Nothing here is a security boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the generator inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceHash(String);

impl SourceHash {
    /// Length of the hex encoding.
    pub const HEX_LEN: usize = 64;

    /// Wrap an existing hex string, e.g. one read from an artifact header.
    ///
    /// Returns `None` unless `hex` is exactly 64 lowercase hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == Self::HEX_LEN
            && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(hex.to_string()))
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental builder for a [`SourceHash`].
#[derive(Clone, Default)]
pub struct SourceHasher {
    hasher: Sha256,
    inputs: usize,
}

impl fmt::Debug for SourceHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHasher")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl SourceHasher {
    /// Start an empty hash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input file.
    pub fn update(&mut self, label: &str, bytes: &[u8]) {
        self.hasher.update(label.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update(bytes);
        self.hasher.update([0u8]);
        self.inputs += 1;
    }

    /// Number of inputs fed so far.
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    /// Finish and hex-encode.
    pub fn finish(self) -> SourceHash {
        let digest = self.hasher.finalize();
        SourceHash(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}
