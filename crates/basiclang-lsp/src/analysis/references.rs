//! Cross-document queries: rename planning, definition lookup, references.
//!
//! A name's reach is decided by the document the request starts from. If
//! that document declares the name as exported, every open document is
//! searched; otherwise only the origin document is. Occurrences are matched
//! lexically, ignoring case: there is no scope analysis.

use basiclang_syntax::{is_valid_identifier, Span, Token};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::position::token_at;
use super::symbols::{definition_location, find_declaration, is_public, Location};
use crate::config::DefinitionScope;
use crate::snapshot::{DocumentSnapshot, DocumentUri};
use crate::store::DocumentStore;

/// Replace the text covered by `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Range being replaced.
    pub span: Span,
    /// Replacement text.
    pub new_text: String,
}

/// Edits grouped by document.
///
/// Documents with no edits are never present, and the edits of one document
/// never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    changes: BTreeMap<DocumentUri, Vec<TextEdit>>,
}

impl EditPlan {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, uri: DocumentUri, edits: Vec<TextEdit>) {
        if edits.is_empty() {
            return;
        }
        debug_assert!(non_overlapping(&edits), "overlapping edits for {uri}");
        self.changes.insert(uri, edits);
    }

    /// Whether the plan touches no document.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of documents touched.
    pub fn document_count(&self) -> usize {
        self.changes.len()
    }

    /// Total number of edits across all documents.
    pub fn edit_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    /// Whether the plan touches `uri`.
    pub fn contains(&self, uri: &DocumentUri) -> bool {
        self.changes.contains_key(uri)
    }

    /// Edits for one document.
    pub fn edits(&self, uri: &DocumentUri) -> Option<&[TextEdit]> {
        self.changes.get(uri).map(Vec::as_slice)
    }

    /// Documents and their edits, ordered by URI.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentUri, &[TextEdit])> {
        self.changes.iter().map(|(uri, edits)| (uri, edits.as_slice()))
    }
}

impl IntoIterator for EditPlan {
    type Item = (DocumentUri, Vec<TextEdit>);
    type IntoIter = std::collections::btree_map::IntoIter<DocumentUri, Vec<TextEdit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

fn non_overlapping(edits: &[TextEdit]) -> bool {
    let mut spans: Vec<Span> = edits.iter().map(|e| e.span).collect();
    spans.sort_by_key(|s| s.start);
    spans.windows(2).all(|pair| !pair[0].overlaps(&pair[1]))
}

/// Result of planning a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// At least one occurrence will change.
    Planned(EditPlan),
    /// The name occurs nowhere in the searched documents.
    NoOccurrences,
    /// There is no identifier at the requested position.
    NoSymbol,
    /// The origin document is not open.
    DocumentNotOpen,
    /// The replacement is not a usable identifier.
    InvalidNewName(String),
}

impl RenameOutcome {
    /// The plan, if one was produced.
    pub fn into_plan(self) -> Option<EditPlan> {
        match self {
            Self::Planned(plan) => Some(plan),
            _ => None,
        }
    }
}

fn occurrences<'a>(snapshot: &'a DocumentSnapshot, name: &'a str) -> impl Iterator<Item = &'a Token> {
    snapshot.tokens().iter().filter(move |t| t.names(name))
}

/// The documents a query on `name` from `origin` has to look at.
///
/// The origin snapshot stands in for whatever the store currently holds for
/// that document, so one request never mixes two versions of it.
fn candidate_documents(
    store: &DocumentStore,
    origin: &Arc<DocumentSnapshot>,
    name: &str,
) -> Vec<Arc<DocumentSnapshot>> {
    if !is_public(origin, name) {
        return vec![Arc::clone(origin)];
    }
    let mut documents: Vec<_> = store
        .all_open_snapshots()
        .into_iter()
        .filter(|snapshot| snapshot.uri() != origin.uri())
        .collect();
    documents.push(Arc::clone(origin));
    documents
}

/// Plan renaming every occurrence of `name` reachable from `origin_uri`.
pub fn compute_rename_edits(
    store: &DocumentStore,
    origin_uri: &DocumentUri,
    name: &str,
    new_name: &str,
) -> RenameOutcome {
    let Some(origin) = store.get(origin_uri) else {
        return RenameOutcome::DocumentNotOpen;
    };
    rename_from(store, &origin, name, new_name)
}

pub(crate) fn rename_from(
    store: &DocumentStore,
    origin: &Arc<DocumentSnapshot>,
    name: &str,
    new_name: &str,
) -> RenameOutcome {
    if !is_valid_identifier(new_name) {
        return RenameOutcome::InvalidNewName(new_name.to_string());
    }

    let mut plan = EditPlan::new();
    for snapshot in candidate_documents(store, origin, name) {
        let edits = occurrences(&snapshot, name)
            .map(|token| TextEdit {
                span: token.span(),
                new_text: new_name.to_string(),
            })
            .collect();
        plan.insert(snapshot.uri().clone(), edits);
    }

    if plan.is_empty() {
        RenameOutcome::NoOccurrences
    } else {
        tracing::debug!(
            "Rename {} -> {}: {} edit(s) in {} document(s)",
            name,
            new_name,
            plan.edit_count(),
            plan.document_count()
        );
        RenameOutcome::Planned(plan)
    }
}

/// The snapshot that declares `name` for a query from `origin`.
pub(crate) fn declaring_snapshot(
    store: &DocumentStore,
    origin: &Arc<DocumentSnapshot>,
    name: &str,
    scope: DefinitionScope,
) -> Option<Arc<DocumentSnapshot>> {
    if find_declaration(origin, name).is_some() {
        return Some(Arc::clone(origin));
    }
    match scope {
        DefinitionScope::Document => None,
        DefinitionScope::Workspace => store
            .all_open_snapshots()
            .into_iter()
            .filter(|snapshot| snapshot.uri() != origin.uri())
            .find(|snapshot| is_public(snapshot, name)),
    }
}

/// Where `name`, as used in `uri`, is declared.
///
/// The requesting document is searched first. With
/// [`DefinitionScope::Workspace`] an exported declaration in another open
/// document is used when the requesting document has none.
pub fn compute_definition(
    store: &DocumentStore,
    uri: &DocumentUri,
    name: &str,
    scope: DefinitionScope,
) -> Option<Location> {
    let origin = store.get(uri)?;
    let declaring = declaring_snapshot(store, &origin, name, scope)?;
    definition_location(&declaring, name)
}

/// The identifier at a position and its span, if it can be renamed.
pub fn prepare_rename(snapshot: &DocumentSnapshot, line: u32, column: u32) -> Option<(Span, String)> {
    token_at(snapshot, line, column)
        .filter(|t| t.is_identifier())
        .map(|t| (t.span(), t.lexeme.clone()))
}

/// Every occurrence of `name` reachable from `uri`, ordered by document
/// then position.
///
/// With `include_declaration` unset, the name tokens of top-level
/// declarations of `name` are left out.
pub fn find_references(
    store: &DocumentStore,
    uri: &DocumentUri,
    name: &str,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(origin) = store.get(uri) else {
        return Vec::new();
    };
    references_from(store, &origin, name, include_declaration)
}

pub(crate) fn references_from(
    store: &DocumentStore,
    origin: &Arc<DocumentSnapshot>,
    name: &str,
    include_declaration: bool,
) -> Vec<Location> {
    let mut documents = candidate_documents(store, origin, name);
    documents.sort_by(|a, b| a.uri().cmp(b.uri()));

    let mut locations = Vec::new();
    for snapshot in &documents {
        let declared_at = find_declaration(snapshot, name).map(|d| d.header().name_span);
        locations.extend(
            occurrences(snapshot, name)
                .map(Token::span)
                .filter(|span| include_declaration || Some(*span) != declared_at)
                .map(|span| Location {
                    uri: snapshot.uri().clone(),
                    span,
                }),
        );
    }
    locations
}
