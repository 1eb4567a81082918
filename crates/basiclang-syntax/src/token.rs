//! Lexical tokens handed to the analysis layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::{Position, Span};

/// Broad token classes. Only [`TokenKind::Identifier`] tokens take part in
/// symbol resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// A user-defined name.
    Identifier,
    /// A reserved word such as `Class` or `End`.
    Keyword,
    /// Number or string literal.
    Literal,
    /// Operators and separators.
    Punctuation,
    /// `'` or `Rem` comment, running to the end of the line.
    Comment,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::Literal => "literal",
            Self::Punctuation => "punctuation",
            Self::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// A token with its 1-based start coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Exact source text.
    pub lexeme: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column of the first character.
    pub column: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Width in columns (characters of the lexeme).
    #[must_use]
    pub fn len(&self) -> u32 {
        self.lexeme.chars().count() as u32
    }

    /// Whether the lexeme is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lexeme.is_empty()
    }

    /// Start coordinate.
    #[must_use]
    pub const fn start(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Half-open span covered by the token.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::on_line(self.line, self.column, self.len())
    }

    /// Whether `(line, column)` falls in `[column, column + len)` on this token's line.
    #[must_use]
    pub fn covers(&self, line: u32, column: u32) -> bool {
        line == self.line && column >= self.column && column < self.column + self.len()
    }

    /// Whether this is an identifier token.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Whether this is the given keyword, ignoring case.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme.eq_ignore_ascii_case(keyword)
    }

    /// Whether this is the given punctuation.
    #[must_use]
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.lexeme == punct
    }

    /// Whether this identifier names `name`. BasicLang names are case-insensitive.
    #[must_use]
    pub fn names(&self, name: &str) -> bool {
        self.is_identifier() && self.lexeme.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` at {}", self.kind, self.lexeme, self.start())
    }
}
