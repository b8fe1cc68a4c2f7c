//! # Diagnostics
//!
//! Validation findings are values, not errors. Every check appends a
//! [`Diagnostic`] to a [`DiagnosticsReport`]; only the binary turns the report
//! into a process exit code.
//!
//! ## Exit-code classes
//!
//! | Class | Meaning |
//! |-------|---------|
//! | 1 | Schema: missing, mistyped, duplicate or invalid-enum field |
//! | 2 | File not found: declared source or header absent |
//! | 3 | Dependency: unknown capability name, or a module cycle |
//! | 4 | Naming: invalid identifier, name/directory or register mismatch |
//! | 5 | Parameter: default/type mismatch, bad range, duplicate parameter |
//! | 6 | Code verification: register function not found in sources |
//!
//! The exit code of a failing run is the class of the *first* recorded
//! error, not the most severe one. Warnings never change it.

use std::fmt;

use serde::Serialize;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks generation and sets the exit code.
    Error,
    /// Reported only.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Warning => f.write_str("WARNING"),
        }
    }
}

/// Exit-code class of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorClass {
    /// Structural or enumerated-value problem.
    Schema,
    /// A declared file does not exist.
    FileNotFound,
    /// Capability or module-graph problem.
    Dependency,
    /// Identifier or naming-convention problem.
    Naming,
    /// Parameter declaration problem.
    Parameter,
    /// Register function not found by text search.
    CodeVerification,
}

impl ErrorClass {
    /// Process exit code for this class.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Schema => 1,
            Self::FileNotFound => 2,
            Self::Dependency => 3,
            Self::Naming => 4,
            Self::Parameter => 5,
            Self::CodeVerification => 6,
        }
    }

    /// Name printed in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "SchemaError",
            Self::FileNotFound => "FileNotFoundError",
            Self::Dependency => "DependencyError",
            Self::Naming => "NamingViolationError",
            Self::Parameter => "ParameterError",
            Self::CodeVerification => "CodeVerificationError",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Property name, module name, or `GLOBAL`.
    pub entity: String,
    /// Error or warning.
    pub severity: Severity,
    /// Exit-code class.
    pub class: ErrorClass,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}: [{}] {}", self.entity, self.class, self.message),
            Severity::Warning => write!(f, "{}: {}", self.entity, self.message),
        }
    }
}

/// Every finding of one validation run, in the order recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, entity: impl Into<String>, class: ErrorClass, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            entity: entity.into(),
            severity: Severity::Error,
            class,
            message: message.into(),
        });
    }

    /// Record a warning. The class is kept for grouping only.
    pub fn warning(
        &mut self,
        entity: impl Into<String>,
        class: ErrorClass,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            entity: entity.into(),
            severity: Severity::Warning,
            class,
            message: message.into(),
        });
    }

    /// All findings.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error findings in recorded order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Warning findings in recorded order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Whether any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Number of errors.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Class of the first recorded error.
    pub fn first_error_class(&self) -> Option<ErrorClass> {
        self.errors().next().map(|d| d.class)
    }

    /// 0 when there are no errors, otherwise the first error's class code.
    pub fn exit_code(&self) -> u8 {
        self.first_error_class().map_or(0, ErrorClass::exit_code)
    }

    /// Whether any finding (of either severity) concerns `entity`.
    pub fn mentions(&self, entity: &str) -> bool {
        self.diagnostics.iter().any(|d| d.entity == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_is_first_error_class() {
        let mut report = DiagnosticsReport::new();
        report.warning("a", ErrorClass::FileNotFound, "missing test");
        report.error("b", ErrorClass::Naming, "bad name");
        report.error("c", ErrorClass::Schema, "missing field");
        assert_eq!(report.exit_code(), 4);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_warnings_never_set_exit_code() {
        let mut report = DiagnosticsReport::new();
        report.warning("a", ErrorClass::CodeVerification, "lowercase");
        assert!(!report.has_errors());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_class_codes() {
        let codes: Vec<u8> = [
            ErrorClass::Schema,
            ErrorClass::FileNotFound,
            ErrorClass::Dependency,
            ErrorClass::Naming,
            ErrorClass::Parameter,
            ErrorClass::CodeVerification,
        ]
        .into_iter()
        .map(ErrorClass::exit_code)
        .collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic {
            entity: "sage_infall".into(),
            severity: Severity::Error,
            class: ErrorClass::Naming,
            message: "name mismatch".into(),
        };
        assert_eq!(d.to_string(), "sage_infall: [NamingViolationError] name mismatch");
    }
}
