//! Token and declaration model for BasicLang.
//!
//! This crate is the data contract between a BasicLang front end and the
//! language server: positioned [`Token`]s, the [`Declaration`] tree, and
//! recoverable [`ParseError`]s. The [`SourceParser`] trait is the seam the
//! server parses through; [`BasicParser`] is the bundled implementation, a
//! Logos tokenizer plus a declaration scanner that understands
//! `Class`/`Function`/`Sub` blocks and variable declarations. It is not a
//! full grammar: statement bodies are tokenized but not parsed.
//!
//! # Example
//!
//! ```
//! use basiclang_syntax::{parse, DeclarationKind};
//!
//! let result = parse("Public Function Compute(a)\n  Compute = a\nEnd Function\n");
//! assert!(result.errors.is_empty());
//! assert_eq!(result.declarations[0].kind(), DeclarationKind::Function);
//! assert_eq!(result.declarations[0].name(), "Compute");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
mod error;
pub mod lexer;
mod parser;
mod span;
mod token;

pub use ast::{Access, Declaration, DeclarationKind, Parameter, SymbolHeader};
pub use error::{ParseError, ParseErrorKind, ParseFailure};
pub use lexer::{is_keyword, is_valid_identifier};
pub use span::{LineIndex, Position, Span};
pub use token::{Token, TokenKind};

/// Result of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Every token in source order, comments included.
    pub tokens: Vec<Token>,
    /// Top-level declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Recoverable errors encountered.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// A result with no tokens, declarations or errors.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Something that turns source text into a [`ParseResult`].
///
/// Implementations must be shareable across threads; the language server
/// parses on whichever thread applies a document change.
pub trait SourceParser: Send + Sync {
    /// Parse `source`. `Err` means no usable result at all; recoverable
    /// problems belong in [`ParseResult::errors`].
    fn parse(&self, source: &str) -> Result<ParseResult, ParseFailure>;
}

/// The bundled BasicLang parser.
#[derive(Debug, Clone, Default)]
pub struct BasicParser {
    max_source_bytes: Option<usize>,
}

impl BasicParser {
    /// A parser with no size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_source_bytes: None,
        }
    }

    /// A parser that refuses documents larger than `limit` bytes.
    #[must_use]
    pub const fn with_size_limit(limit: usize) -> Self {
        Self {
            max_source_bytes: Some(limit),
        }
    }
}

impl SourceParser for BasicParser {
    fn parse(&self, source: &str) -> Result<ParseResult, ParseFailure> {
        if let Some(limit) = self.max_source_bytes {
            if source.len() > limit {
                return Err(ParseFailure::TooLarge {
                    size: source.len(),
                    limit,
                });
            }
        }
        Ok(parse(source))
    }
}

/// Parse BasicLang source. Never fails; problems are collected in
/// [`ParseResult::errors`].
pub fn parse(source: &str) -> ParseResult {
    let (tokens, mut errors) = lexer::tokenize(source);
    let declarations = parser::scan_declarations(&tokens, &mut errors);
    ParseResult {
        tokens,
        declarations,
        errors,
    }
}
