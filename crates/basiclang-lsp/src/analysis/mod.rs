//! Read-side queries over the document store.
//!
//! The free functions in the submodules work on snapshots and names. The
//! [`Analysis`] handle wraps them in position-keyed queries: it fetches one
//! snapshot of the requesting document up front and answers the whole
//! request from it.

pub mod position;
pub mod references;
pub mod symbols;

use basiclang_syntax::{Declaration, Span, Token};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::snapshot::{DocumentSnapshot, DocumentUri};
use crate::store::DocumentStore;

pub use position::{enclosing_declaration, token_at, word_at};
pub use references::{
    compute_definition, compute_rename_edits, find_references, prepare_rename, EditPlan,
    RenameOutcome, TextEdit,
};
pub use symbols::{
    definition_location, document_outline, find_declaration, hover_text, is_public, Location,
    OutlineEntry,
};

/// Shared handle for answering requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Analysis {
    store: Arc<DocumentStore>,
    config: Arc<ServerConfig>,
}

impl Analysis {
    /// Wrap a store and configuration.
    pub fn new(store: Arc<DocumentStore>, config: Arc<ServerConfig>) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Latest snapshot of a document.
    pub fn snapshot(&self, uri: &DocumentUri) -> Option<Arc<DocumentSnapshot>> {
        self.store.get(uri)
    }

    /// The identifier at a position.
    pub fn word_at(&self, uri: &DocumentUri, line: u32, column: u32) -> Option<String> {
        let snapshot = self.store.get(uri)?;
        word_at(&snapshot, line, column).map(str::to_string)
    }

    /// The token of any kind at a position.
    pub fn token_at(&self, uri: &DocumentUri, line: u32, column: u32) -> Option<Token> {
        let snapshot = self.store.get(uri)?;
        token_at(&snapshot, line, column).cloned()
    }

    /// The innermost declaration around a position.
    pub fn enclosing_declaration(
        &self,
        uri: &DocumentUri,
        line: u32,
        column: u32,
    ) -> Option<Declaration> {
        let snapshot = self.store.get(uri)?;
        enclosing_declaration(&snapshot, line, column).cloned()
    }

    /// Hover text for the identifier at a position, with the identifier's
    /// span in the requesting document.
    pub fn hover(&self, uri: &DocumentUri, line: u32, column: u32) -> Option<(Span, String)> {
        let snapshot = self.store.get(uri)?;
        let token = token_at(&snapshot, line, column).filter(|t| t.is_identifier())?;
        let declaring = references::declaring_snapshot(
            &self.store,
            &snapshot,
            &token.lexeme,
            self.config.definition_scope,
        )?;
        let text = hover_text(&declaring, &token.lexeme)?;
        Some((token.span(), text))
    }

    /// Declaration of the identifier at a position.
    pub fn definition(&self, uri: &DocumentUri, line: u32, column: u32) -> Option<Location> {
        let snapshot = self.store.get(uri)?;
        let name = word_at(&snapshot, line, column)?;
        let declaring = references::declaring_snapshot(
            &self.store,
            &snapshot,
            name,
            self.config.definition_scope,
        )?;
        definition_location(&declaring, name)
    }

    /// Outline of a document; empty if it is not open.
    pub fn outline(&self, uri: &DocumentUri) -> Vec<OutlineEntry> {
        self.store
            .get(uri)
            .map(|snapshot| document_outline(&snapshot))
            .unwrap_or_default()
    }

    /// Span and text of the identifier a rename at this position would
    /// change.
    pub fn prepare_rename(&self, uri: &DocumentUri, line: u32, column: u32) -> Option<(Span, String)> {
        let snapshot = self.store.get(uri)?;
        prepare_rename(&snapshot, line, column)
    }

    /// Plan renaming the identifier at a position to `new_name`.
    pub fn rename(&self, uri: &DocumentUri, line: u32, column: u32, new_name: &str) -> RenameOutcome {
        let Some(snapshot) = self.store.get(uri) else {
            return RenameOutcome::DocumentNotOpen;
        };
        let Some(name) = word_at(&snapshot, line, column) else {
            return RenameOutcome::NoSymbol;
        };
        references::rename_from(&self.store, &snapshot, name, new_name)
    }

    /// Occurrences of the identifier at a position.
    pub fn references(
        &self,
        uri: &DocumentUri,
        line: u32,
        column: u32,
        include_declaration: bool,
    ) -> Vec<Location> {
        let Some(snapshot) = self.store.get(uri) else {
            return Vec::new();
        };
        let Some(name) = word_at(&snapshot, line, column) else {
            return Vec::new();
        };
        references::references_from(&self.store, &snapshot, name, include_declaration)
    }
}
