//! Diagnostics data model.
//!
//! Structural validation and spellchecking both report through [`Diagnostic`], so a host can
//! feed one problems panel / underline layer from either source.

use std::ops::Range;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

/// A single diagnostic item for the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Range in character offsets.
    pub range: Range<usize>,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Stable machine-readable code (e.g. `"missing-required"`).
    pub code: &'static str,
    /// Producer (e.g. `"tagdoc-schema"`, `"tagdoc-spell"`).
    pub source: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn schema(
        range: Range<usize>,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: String,
    ) -> Self {
        Self {
            range,
            severity,
            code,
            source: "tagdoc-schema",
            message,
        }
    }
}
