//! Immutable document snapshots.
//!
//! A snapshot is the text of one document together with everything parsed
//! from it. Snapshots are never mutated after construction; an edit produces
//! a new snapshot and readers keep whichever one they already hold.

use basiclang_syntax::{Declaration, ParseError, ParseResult, Token};
use ropey::Rope;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identity of a document, as sent by the editor.
///
/// Cheap to clone; compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri(Arc<str>);

impl DocumentUri {
    /// Wrap a URI string.
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(Arc::from(uri.as_ref()))
    }

    /// The URI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to the protocol's URI type. `None` if the string is not a
    /// syntactically valid URI.
    pub fn to_lsp(&self) -> Option<lsp_types::Uri> {
        lsp_types::Uri::from_str(&self.0).ok()
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for DocumentUri {
    fn from(uri: String) -> Self {
        Self(Arc::from(uri))
    }
}

impl From<&lsp_types::Uri> for DocumentUri {
    fn from(uri: &lsp_types::Uri) -> Self {
        Self::new(uri.as_str())
    }
}

/// The parsed state of one document at one point in time.
#[derive(Debug)]
pub struct DocumentSnapshot {
    uri: DocumentUri,
    text: Rope,
    tokens: Vec<Token>,
    declarations: Vec<Declaration>,
    errors: Vec<ParseError>,
    /// Store-assigned revision; strictly increasing per store.
    version: u64,
    /// Version number the editor attached to this text, if any.
    editor_version: Option<i32>,
}

impl DocumentSnapshot {
    /// Build a snapshot from source text and its parse result.
    pub fn new(
        uri: DocumentUri,
        text: &str,
        parsed: ParseResult,
        version: u64,
        editor_version: Option<i32>,
    ) -> Self {
        let ParseResult {
            tokens,
            declarations,
            errors,
        } = parsed;
        Self {
            uri,
            text: Rope::from_str(text),
            tokens,
            declarations,
            errors,
            version,
            editor_version,
        }
    }

    /// The document this snapshot belongs to.
    pub fn uri(&self) -> &DocumentUri {
        &self.uri
    }

    /// The full document text.
    pub fn text(&self) -> &Rope {
        &self.text
    }

    /// Tokens in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Top-level declarations in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Recoverable parse errors.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Store revision this snapshot was installed at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Editor-supplied version, if the change carried one.
    pub fn editor_version(&self) -> Option<i32> {
        self.editor_version
    }

    /// Text of a 1-based line without its line terminator.
    pub fn line(&self, line: u32) -> Option<String> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        if index >= self.text.len_lines() {
            return None;
        }
        let text = self.text.line(index).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }
}
