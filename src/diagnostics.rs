//! Diagnostics
//!
//! The shared vocabulary for problems found before or during semantic
//! analysis. `crate::lexer` and `crate::parser` emit [`Diagnostic`]s
//! directly; `crate::analyzer` accumulates plain `String`s instead (its
//! contract predates this module and is kept as-is), but
//! `Analyzer::analyze_string` stringifies lexer/parser diagnostics through
//! `Display` before merging them into the same error list, so callers only
//! ever see one shape.

use crate::ast::SourceLocation;
use std::fmt;

/// Severity level for a diagnostic. Most diagnostics in this crate are
/// `Error`; `Warning` is reserved for the two invariants the data model
/// calls out as non-fatal (5: unitary tolerance, 9: bundle qubit overlap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Broad category of a diagnostic, grouped the way §7 of the design groups
/// failure modes; useful for callers that want to filter or count by kind
/// without string-matching the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Version,
    NameResolution,
    OverloadResolution,
    Type,
    Value,
    Dialect,
    Control,
    Link,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Version => "version",
            ErrorKind::NameResolution => "name-resolution",
            ErrorKind::OverloadResolution => "overload-resolution",
            ErrorKind::Type => "type",
            ErrorKind::Value => "value",
            ErrorKind::Dialect => "dialect",
            ErrorKind::Control => "control",
            ErrorKind::Link => "link",
        };
        write!(f, "{s}")
    }
}

/// One diagnostic: what kind of problem, a human-readable message, the
/// severity, and the source location if one is available (the lexer can
/// produce diagnostics before any location-bearing token exists, e.g. an
/// empty file).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub severity: Severity,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Diagnostic { kind, message: message.into(), severity: Severity::Error, location: Some(location) }
    }

    pub fn warning(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Diagnostic { kind, message: message.into(), severity: Severity::Warning, location: Some(location) }
    }

    pub fn without_location(kind: ErrorKind, message: impl Into<String>) -> Self {
        Diagnostic { kind, message: message.into(), severity: Severity::Error, location: None }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: {}: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("a.cq", 4, 2)
    }

    #[test]
    fn display_includes_location_when_present() {
        let d = Diagnostic::error(ErrorKind::Parse, "unexpected token", loc());
        assert_eq!(d.to_string(), "a.cq:4:2: error: unexpected token");
    }

    #[test]
    fn display_omits_location_when_absent() {
        let d = Diagnostic::without_location(ErrorKind::Parse, "empty source");
        assert_eq!(d.to_string(), "error: empty source");
    }

    #[test]
    fn warning_severity_formats_distinctly() {
        let d = Diagnostic::warning(ErrorKind::Value, "unitarity tolerance exceeded", loc());
        assert!(d.to_string().contains("warning"));
    }
}
