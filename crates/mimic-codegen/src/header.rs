//! # Artifact Headers
//!
//! Every generated file opens with the same block of text, wrapped in the
//! comment syntax of its language:
//!
//! ```text
//! AUTO-GENERATED CODE - DO NOT EDIT
//!
//! Generated by: mimicgen
//! Generated on: 2025-01-01 00:00:00
//!
//! Source files:
//!   - metadata/properties/halo_properties.yaml
//!   - metadata/properties/galaxy_properties.yaml
//!   - src/modules/*/module_info.yaml
//!
//! Source hash: <64 hex digits>
//! To regenerate: make generate
//! ```
//!
//! The staleness checker only looks at the first [`HEADER_SCAN_LINES`] lines,
//! so the block must stay short: source files are listed as patterns, never
//! one line per module.

use mimic_core::SourceHash;

/// Marker identifying a file as generated.
pub const MARKER: &str = "AUTO-GENERATED";
/// Label preceding the embedded hash.
pub const HASH_LABEL: &str = "Source hash:";
/// How many leading lines may hold the marker and hash.
pub const HEADER_SCAN_LINES: usize = 20;
/// Name written into the `Generated by:` line.
pub const GENERATOR_NAME: &str = "mimicgen";
/// Command suggested for regeneration.
pub const REGENERATE_COMMAND: &str = "make generate";
/// `strftime` pattern of the `Generated on:` line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Comment syntax for the header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/* ... */` with ` * ` continuation lines.
    CBlock,
    /// `# ` line comments (make, plain text).
    Hash,
    /// A leading `"""` module docstring.
    PythonDoc,
    /// `<!-- ... -->` (Markdown).
    Html,
}

/// Values substituted into the header block.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFields<'a> {
    /// Formatted generation timestamp.
    pub generated_on: &'a str,
    /// Input paths or patterns, repository-relative.
    pub sources: &'a [String],
    /// Hash of all inputs.
    pub hash: &'a SourceHash,
}

/// The header text, one entry per line, without comment syntax.
pub fn header_lines(fields: &HeaderFields<'_>) -> Vec<String> {
    let mut lines = vec![
        format!("{MARKER} CODE - DO NOT EDIT"),
        String::new(),
        format!("Generated by: {GENERATOR_NAME}"),
        format!("Generated on: {}", fields.generated_on),
        String::new(),
        "Source files:".to_string(),
    ];
    lines.extend(fields.sources.iter().map(|s| format!("  - {s}")));
    lines.push(String::new());
    lines.push(format!("{HASH_LABEL} {}", fields.hash));
    lines.push(format!("To regenerate: {REGENERATE_COMMAND}"));
    lines
}

/// Render the header in `style`, followed by one blank line.
pub fn render(style: CommentStyle, fields: &HeaderFields<'_>) -> String {
    let lines = header_lines(fields);
    let mut out = String::new();
    match style {
        CommentStyle::CBlock => {
            for (i, line) in lines.iter().enumerate() {
                let lead = if i == 0 { "/*" } else { " *" };
                push_prefixed(&mut out, lead, line);
            }
            out.push_str(" */\n");
        }
        CommentStyle::Hash => {
            for line in &lines {
                push_prefixed(&mut out, "#", line);
            }
        }
        CommentStyle::PythonDoc => {
            out.push_str("\"\"\"");
            for line in &lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("\"\"\"\n");
        }
        CommentStyle::Html => {
            out.push_str("<!--\n");
            for line in &lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("-->\n");
        }
    }
    out.push('\n');
    out
}

/// One-line form for formats without comments (JSON `_comment`).
pub fn inline(fields: &HeaderFields<'_>) -> String {
    format!(
        "{MARKER} - DO NOT EDIT. Generated by {GENERATOR_NAME} on {}. {HASH_LABEL} {}. To regenerate: {REGENERATE_COMMAND}",
        fields.generated_on, fields.hash
    )
}

fn push_prefixed(out: &mut String, lead: &str, line: &str) {
    out.push_str(lead);
    if !line.is_empty() {
        out.push(' ');
        out.push_str(line);
    }
    out.push('\n');
}
