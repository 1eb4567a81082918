//! The document store: the set of open documents and their latest snapshots.
//!
//! Each open document owns a slot. Writers to the same slot are serialized
//! by the slot's writer lock, so parses of one document never interleave;
//! writers to different documents proceed in parallel. Readers never take a
//! writer lock: they clone the current `Arc<DocumentSnapshot>` and are done.
//!
//! Closing a document removes its slot from the map before retiring it. A
//! writer that looked the slot up just before the close sees the retired
//! flag once it holds the writer lock and starts over with a fresh slot,
//! which makes a late update behave like an open.

use basiclang_syntax::{BasicParser, ParseResult, SourceParser};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::snapshot::{DocumentSnapshot, DocumentUri};

#[derive(Default)]
struct Slot {
    writer: Mutex<()>,
    current: RwLock<Option<Arc<DocumentSnapshot>>>,
    retired: AtomicBool,
}

/// Thread-safe map from document URI to its latest snapshot.
pub struct DocumentStore {
    parser: Arc<dyn SourceParser>,
    slots: RwLock<HashMap<DocumentUri, Arc<Slot>>>,
    revision: AtomicU64,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.slots.read().len())
            .field("revision", &self.revision.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// A store that parses with the bundled [`BasicParser`].
    pub fn new() -> Self {
        Self::with_parser(Arc::new(BasicParser::new()))
    }

    /// A store that parses with the given parser.
    pub fn with_parser(parser: Arc<dyn SourceParser>) -> Self {
        Self {
            parser,
            slots: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
        }
    }

    /// Register a document and parse it.
    pub fn open(&self, uri: &DocumentUri, text: &str) -> Arc<DocumentSnapshot> {
        self.install(uri, text, None)
            .unwrap_or_else(|| self.fallback_snapshot(uri))
    }

    /// Replace a document's text and re-parse. An unknown URI is opened.
    pub fn update(&self, uri: &DocumentUri, text: &str) -> Arc<DocumentSnapshot> {
        self.install(uri, text, None)
            .unwrap_or_else(|| self.fallback_snapshot(uri))
    }

    /// Open with an editor version attached.
    ///
    /// Returns `None` when a snapshot with a newer editor version is
    /// already installed; the stale text is dropped.
    pub fn open_versioned(
        &self,
        uri: &DocumentUri,
        text: &str,
        editor_version: i32,
    ) -> Option<Arc<DocumentSnapshot>> {
        self.install(uri, text, Some(editor_version))
    }

    /// Update with an editor version attached. Same staleness rule as
    /// [`DocumentStore::open_versioned`].
    pub fn update_versioned(
        &self,
        uri: &DocumentUri,
        text: &str,
        editor_version: i32,
    ) -> Option<Arc<DocumentSnapshot>> {
        self.install(uri, text, Some(editor_version))
    }

    /// Forget a document. Returns whether it was open.
    pub fn close(&self, uri: &DocumentUri) -> bool {
        let Some(slot) = self.slots.write().remove(uri) else {
            return false;
        };
        let _writer = slot.writer.lock();
        slot.retired.store(true, Ordering::Release);
        let was_open = slot.current.write().take().is_some();
        tracing::debug!("Closed document: {}", uri);
        was_open
    }

    /// The latest snapshot of a document, if it is open.
    pub fn get(&self, uri: &DocumentUri) -> Option<Arc<DocumentSnapshot>> {
        let slot = self.slots.read().get(uri).cloned()?;
        let current = slot.current.read().clone();
        current
    }

    /// Whether a document is open.
    pub fn contains(&self, uri: &DocumentUri) -> bool {
        self.get(uri).is_some()
    }

    /// Latest snapshots of every open document, ordered by URI.
    ///
    /// Each snapshot is individually consistent; the set as a whole is not
    /// an atomic view of the store.
    pub fn all_open_snapshots(&self) -> Vec<Arc<DocumentSnapshot>> {
        let slots: Vec<Arc<Slot>> = self.slots.read().values().cloned().collect();
        let mut snapshots: Vec<_> = slots
            .iter()
            .filter_map(|slot| slot.current.read().clone())
            .collect();
        snapshots.sort_by(|a, b| a.uri().cmp(b.uri()));
        snapshots
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether no documents are open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent revision handed out.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn slot_for(&self, uri: &DocumentUri) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(uri) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(uri.clone()).or_default())
    }

    fn install(
        &self,
        uri: &DocumentUri,
        text: &str,
        editor_version: Option<i32>,
    ) -> Option<Arc<DocumentSnapshot>> {
        loop {
            let slot = self.slot_for(uri);
            let _writer = slot.writer.lock();
            if slot.retired.load(Ordering::Acquire) {
                continue;
            }

            let installed = slot
                .current
                .read()
                .as_ref()
                .and_then(|snapshot| snapshot.editor_version());
            if let (Some(incoming), Some(installed)) = (editor_version, installed) {
                if incoming < installed {
                    tracing::warn!(
                        "Dropping stale text for {}: version {} is older than {}",
                        uri,
                        incoming,
                        installed
                    );
                    return None;
                }
            }

            let parsed = self.parse(uri, text);
            let version = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
            let snapshot = Arc::new(DocumentSnapshot::new(
                uri.clone(),
                text,
                parsed,
                version,
                editor_version.or(installed),
            ));
            *slot.current.write() = Some(Arc::clone(&snapshot));
            tracing::debug!("Installed {} at revision {}", uri, version);
            return Some(snapshot);
        }
    }

    fn parse(&self, uri: &DocumentUri, text: &str) -> ParseResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.parser.parse(text))) {
            Ok(Ok(result)) => result,
            Ok(Err(failure)) => {
                tracing::warn!("Failed to parse {}: {}", uri, failure);
                ParseResult::empty()
            }
            Err(_) => {
                tracing::error!("Parser panicked on {}", uri);
                ParseResult::empty()
            }
        }
    }

    // Unversioned writes never lose to the staleness check, so this only
    // runs if that invariant is broken.
    fn fallback_snapshot(&self, uri: &DocumentUri) -> Arc<DocumentSnapshot> {
        self.get(uri).unwrap_or_else(|| {
            Arc::new(DocumentSnapshot::new(
                uri.clone(),
                "",
                ParseResult::empty(),
                self.revision(),
                None,
            ))
        })
    }
}
