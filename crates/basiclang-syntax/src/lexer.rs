//! BasicLang tokenizer built on Logos.
//!
//! Keywords are recognised after lexing, case-insensitively, so `CLASS`,
//! `Class` and `class` all produce a keyword token. Newlines are consumed
//! here; statement boundaries are recovered from token line numbers.

use logos::Logos;

use crate::error::{ParseError, ParseErrorKind};
use crate::span::LineIndex;
use crate::token::{Token, TokenKind};

/// Reserved words, lowercase.
const KEYWORDS: &[&str] = &[
    "and", "as", "boolean", "byref", "byval", "call", "case", "class", "const", "dim", "do",
    "double", "each", "else", "elseif", "end", "exit", "false", "for", "function", "if", "in",
    "integer", "is", "long", "loop", "me", "mod", "new", "next", "not", "nothing", "optional",
    "or", "print", "private", "public", "redim", "rem", "return", "select", "set", "single",
    "step", "string", "sub", "then", "to", "true", "until", "variant", "wend", "while", "xor",
];

/// Raw lexer output before keyword classification.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f]+")]
enum RawToken {
    #[regex(r"\r\n|\r|\n")]
    Newline,

    /// `'` comment; the slice includes the quote.
    #[regex(r"'[^\n\r]*")]
    Comment,

    /// Identifier or keyword, with an optional `$` string suffix.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*\$?")]
    Word,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"&[hH][0-9A-Fa-f]+")]
    Number,

    /// Double-quoted string; `""` escapes a quote.
    #[regex(r#""([^"\n\r]|"")*""#)]
    String,

    /// A string that reaches the end of the line without closing.
    #[regex(r#""([^"\n\r]|"")*"#)]
    UnterminatedString,

    #[regex(r"<>|<=|>=|[=<>+\-*/\\^&(),.:;\[\]]")]
    Punct,
}

/// Whether `word` is a reserved word, ignoring case.
pub fn is_keyword(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    KEYWORDS.binary_search(&lower.as_str()).is_ok()
}

/// Whether `name` can be used as a BasicLang identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let body = name.strip_suffix('$').unwrap_or(name);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_keyword(body)
}

/// Tokenize source into positioned tokens plus lexical errors.
///
/// Never fails: unrecognised characters are reported and skipped.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<ParseError>) {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let start = index.position(range.start);
        let slice = lexer.slice();

        let kind = match result {
            Ok(RawToken::Newline) => continue,
            Ok(RawToken::Comment) => TokenKind::Comment,
            Ok(RawToken::Word) if slice.eq_ignore_ascii_case("rem") => {
                // `Rem` swallows the rest of the line.
                let rest = lexer.remainder();
                let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
                lexer.bump(len);
                tokens.push(Token::new(
                    TokenKind::Comment,
                    lexer.slice(),
                    start.line,
                    start.column,
                ));
                continue;
            }
            Ok(RawToken::Word) if is_keyword(slice) => TokenKind::Keyword,
            Ok(RawToken::Word) => TokenKind::Identifier,
            Ok(RawToken::Number | RawToken::String) => TokenKind::Literal,
            Ok(RawToken::UnterminatedString) => {
                errors.push(ParseError::new(
                    ParseErrorKind::UnterminatedString,
                    index.span(range.clone()),
                ));
                TokenKind::Literal
            }
            Ok(RawToken::Punct) => TokenKind::Punctuation,
            Err(()) => {
                let ch = slice.chars().next().unwrap_or('\u{fffd}');
                errors.push(ParseError::new(
                    ParseErrorKind::UnexpectedChar(ch),
                    index.span(range),
                ));
                continue;
            }
        };

        tokens.push(Token::new(kind, slice, start.line, start.column));
    }

    (tokens, errors)
}
