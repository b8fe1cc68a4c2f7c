//! `module_registry_hash.txt`: the hash the last generation run used.
//!
//! `generate` compares it with the current hash to skip rewriting an
//! up-to-date tree.

use std::path::Path;

use mimic_core::SourceHash;

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;

/// Key of the hash line.
pub const HASH_KEY: &str = "SOURCE_HASH";

/// Render the hash file.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut out = ctx.header(CommentStyle::Hash);
    out.push_str(&format!("{HASH_KEY}={}\n", ctx.hash()));
    Ok(out)
}

/// Hash recorded in an existing hash file, if it can be read.
pub fn read_recorded(path: &Path) -> Option<SourceHash> {
    let content = std::fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        let value = line.strip_prefix(HASH_KEY)?.strip_prefix('=')?;
        SourceHash::from_hex(value.trim())
    })
}
