//! Language Server Protocol implementation for BasicLang.
//!
//! This crate provides an LSP server for BasicLang source files:
//! - Syntax error diagnostics
//! - Go-to-definition, including across open documents
//! - Hover information for declarations
//! - Find references
//! - Document symbols (outline view)
//! - Rename, scoped by declared visibility
//!
//! # Architecture
//!
//! The server follows rust-analyzer's architecture:
//! - **Main loop**: Applies document changes in order, dispatches requests
//! - **Document store**: Per-document immutable snapshots behind `Arc`
//! - **Handlers**: Answer requests on a worker pool against those snapshots
//!
//! # Example
//!
//! ```
//! use basiclang_lsp::{DocumentStore, DocumentUri, analysis};
//!
//! let store = DocumentStore::new();
//! let uri = DocumentUri::from("file:///main.bas");
//! store.open(&uri, "Public Sub Main()\nEnd Sub\nCall Main\n");
//!
//! let plan = analysis::compute_rename_edits(&store, &uri, "main", "Start")
//!     .into_plan()
//!     .unwrap();
//! assert_eq!(plan.edit_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod handlers;
pub mod main_loop;

mod server;
mod snapshot;
mod store;
mod task_pool;

pub use analysis::Analysis;
pub use config::{DefinitionScope, ServerConfig};
pub use main_loop::{run_main_loop, run_main_loop_with_store};
pub use server::{
    initialize_result, negotiate_position_encoding, server_capabilities, start_stdio, Server,
    ServerError,
};
pub use snapshot::{DocumentSnapshot, DocumentUri};
pub use store::DocumentStore;
pub use task_pool::TaskPool;

/// LSP server version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
