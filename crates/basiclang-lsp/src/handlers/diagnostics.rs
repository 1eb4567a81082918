//! Diagnostics for publishing parse errors.

use basiclang_syntax::ParseError;
use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use super::utils::to_lsp_range;
use crate::snapshot::DocumentSnapshot;

/// Diagnostic source reported to the editor.
pub const DIAGNOSTIC_SOURCE: &str = "basiclang";

/// Convert a snapshot's parse errors to LSP diagnostics.
pub fn parse_errors_to_diagnostics(snapshot: &DocumentSnapshot) -> Vec<Diagnostic> {
    snapshot
        .errors()
        .iter()
        .map(parse_error_to_diagnostic)
        .collect()
}

/// Convert a single parse error to an LSP diagnostic.
pub fn parse_error_to_diagnostic(error: &ParseError) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(error.span),
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String(format!("B{:04}", error.kind_code()))),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: error.message(),
        related_information: None,
        tags: None,
        code_description: None,
        data: None,
    }
}
