//! Parse error types.

use thiserror::Error;

use crate::ast::DeclarationKind;
use crate::Span;

/// A recoverable parse error with location information.
///
/// These become editor diagnostics; parsing always continues past them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::UnexpectedChar(_) => 1,
            ParseErrorKind::UnterminatedString => 2,
            ParseErrorKind::Expected(_) => 3,
            ParseErrorKind::UnterminatedBlock(_) => 4,
            ParseErrorKind::MismatchedEnd { .. } => 5,
            ParseErrorKind::UnmatchedEnd(_) => 6,
            ParseErrorKind::MisplacedDeclaration(_) => 7,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Character the lexer does not recognise.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    /// String literal not closed before the end of the line.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A required token is missing.
    #[error("expected {0}")]
    Expected(String),
    /// A block with no `End` statement.
    #[error("`{0}` block is never closed")]
    UnterminatedBlock(DeclarationKind),
    /// `End X` closing a block of a different kind.
    #[error("`End {found}` does not match the open `{expected}` block")]
    MismatchedEnd {
        /// Kind of the innermost open block.
        expected: DeclarationKind,
        /// Kind named by the `End` statement.
        found: DeclarationKind,
    },
    /// `End X` with no open block.
    #[error("`End {0}` without a matching `{0}`")]
    UnmatchedEnd(DeclarationKind),
    /// Declaration in a position where it cannot appear.
    #[error("`{0}` cannot be declared here")]
    MisplacedDeclaration(DeclarationKind),
}

/// Failure of a parser as a whole, as opposed to a recoverable [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// The document exceeds the configured size limit.
    #[error("document is {size} bytes, above the {limit} byte limit")]
    TooLarge {
        /// Document size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// The parser gave up.
    #[error("parser aborted: {0}")]
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn span() -> Span {
        Span::new(Position::new(1, 1), Position::new(1, 4))
    }

    #[test]
    fn test_messages() {
        let err = ParseError::new(ParseErrorKind::UnterminatedBlock(DeclarationKind::Class), span());
        assert_eq!(err.message(), "`Class` block is never closed");
        assert_eq!(err.to_string(), err.message());

        let err = ParseError::new(
            ParseErrorKind::MismatchedEnd {
                expected: DeclarationKind::Function,
                found: DeclarationKind::Subroutine,
            },
            span(),
        );
        assert_eq!(
            err.message(),
            "`End Sub` does not match the open `Function` block"
        );
    }

    #[test]
    fn test_kind_codes_are_unique() {
        let kinds = [
            ParseErrorKind::UnexpectedChar('x'),
            ParseErrorKind::UnterminatedString,
            ParseErrorKind::Expected("name".to_string()),
            ParseErrorKind::UnterminatedBlock(DeclarationKind::Class),
            ParseErrorKind::MismatchedEnd {
                expected: DeclarationKind::Class,
                found: DeclarationKind::Function,
            },
            ParseErrorKind::UnmatchedEnd(DeclarationKind::Subroutine),
            ParseErrorKind::MisplacedDeclaration(DeclarationKind::Class),
        ];
        let mut codes: Vec<u32> = kinds
            .into_iter()
            .map(|kind| ParseError::new(kind, span()).kind_code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn test_parse_failure_display() {
        let failure = ParseFailure::TooLarge { size: 10, limit: 4 };
        assert_eq!(
            failure.to_string(),
            "document is 10 bytes, above the 4 byte limit"
        );
    }
}
