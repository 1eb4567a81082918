//! Conversions between protocol and analysis coordinates.
//!
//! The protocol counts lines and characters from 0; tokens count from 1.
//! A protocol `character` is treated as a character index into the line.

use basiclang_syntax::{Position as SourcePosition, Span};
use lsp_types::{Position, Range};

use crate::analysis::Location;
use crate::snapshot::DocumentUri;

/// Protocol position to 1-based `(line, column)`.
///
/// Saturates instead of wrapping, so an absurd position stays out of range
/// rather than aliasing a real one.
pub fn to_source_position(position: Position) -> (u32, u32) {
    (
        position.line.saturating_add(1),
        position.character.saturating_add(1),
    )
}

/// 1-based source position to a protocol position.
pub fn to_lsp_position(position: SourcePosition) -> Position {
    Position::new(
        position.line.saturating_sub(1),
        position.column.saturating_sub(1),
    )
}

/// Source span to a protocol range.
pub fn to_lsp_range(span: Span) -> Range {
    Range {
        start: to_lsp_position(span.start),
        end: to_lsp_position(span.end),
    }
}

/// Analysis location to a protocol location. `None` if the URI does not
/// parse.
pub fn to_lsp_location(location: &Location) -> Option<lsp_types::Location> {
    Some(lsp_types::Location {
        uri: location.uri.to_lsp()?,
        range: to_lsp_range(location.span),
    })
}

/// Store key for a protocol URI.
pub fn document_uri(uri: &lsp_types::Uri) -> DocumentUri {
    DocumentUri::from(uri)
}
