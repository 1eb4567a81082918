//! Server configuration, read from `initializationOptions`.
//!
//! ```json
//! {
//!   "workerThreads": 4,
//!   "definitionScope": "workspace",
//!   "maxDocumentBytes": 8388608
//! }
//! ```
//!
//! Every field is optional. A malformed section is logged and the defaults
//! are used instead.

use serde::Deserialize;

/// Where go-to-definition looks for a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefinitionScope {
    /// Only the requesting document.
    Document,
    /// The requesting document first, then public declarations in every
    /// other open document.
    #[default]
    Workspace,
}

/// Effective server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Threads serving requests.
    pub worker_threads: usize,
    /// Go-to-definition and hover lookup scope.
    pub definition_scope: DefinitionScope,
    /// Documents larger than this are stored with an empty parse.
    pub max_document_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            definition_scope: DefinitionScope::Workspace,
            max_document_bytes: 8 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InitializationOptions {
    #[serde(default)]
    worker_threads: Option<usize>,
    #[serde(default)]
    definition_scope: Option<DefinitionScope>,
    #[serde(default)]
    max_document_bytes: Option<usize>,
}

impl ServerConfig {
    /// Build the configuration from the client's `initializationOptions`.
    pub fn from_initialization_options(options: Option<&serde_json::Value>) -> Self {
        let mut config = Self::default();
        let Some(value) = options else {
            return config;
        };
        if value.is_null() {
            return config;
        }

        match serde_json::from_value::<InitializationOptions>(value.clone()) {
            Ok(options) => {
                if let Some(threads) = options.worker_threads {
                    config.worker_threads = threads.max(1);
                }
                if let Some(scope) = options.definition_scope {
                    config.definition_scope = scope;
                }
                if let Some(limit) = options.max_document_bytes {
                    config.max_document_bytes = limit;
                }
            }
            Err(e) => {
                tracing::warn!("Ignoring invalid initializationOptions: {}", e);
            }
        }
        config
    }
}
