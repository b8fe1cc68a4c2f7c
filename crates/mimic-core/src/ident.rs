//! # Identifier and Version Checks
//!
//! Hand-rolled matchers for the two fixed patterns the validator needs:
//! C identifiers (`^[A-Za-z_][A-Za-z0-9_]*$`) and strict semantic versions
//! (`^\d+\.\d+\.\d+$`).

/// Whether `name` is a valid C identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `version` is exactly `MAJOR.MINOR.PATCH` with decimal components.
pub fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
