//! Main event loop for the LSP server.
//!
//! Follows rust-analyzer's architecture:
//! - Notifications handled synchronously, in arrival order
//! - Requests dispatched to the task pool and answered from snapshots
//! - A request only ever sees changes whose notifications arrived before it

use crate::analysis::Analysis;
use crate::config::ServerConfig;
use crate::handlers::definition::handle_goto_definition;
use crate::handlers::diagnostics::parse_errors_to_diagnostics;
use crate::handlers::hover::handle_hover;
use crate::handlers::references::handle_references;
use crate::handlers::rename::{handle_prepare_rename, handle_rename};
use crate::handlers::symbols::handle_document_symbols;
use crate::handlers::utils::document_uri;
use crate::snapshot::DocumentSnapshot;
use crate::store::DocumentStore;
use crate::task_pool::TaskPool;
use basiclang_syntax::BasicParser;
use crossbeam_channel::{Receiver, Sender};
use lsp_server::{ErrorCode, Message, Notification, Request, RequestId, Response};
use lsp_types::notification::{
    Cancel, DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument,
    DidSaveTextDocument, Exit, Initialized, Notification as _, PublishDiagnostics,
};
use lsp_types::request::{
    DocumentSymbolRequest, GotoDefinition, HoverRequest, Initialize, PrepareRenameRequest,
    References, Rename, Request as LspRequest, Shutdown,
};
use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, InitializeParams, PublishDiagnosticsParams, Uri,
};
use serde::de::DeserializeOwned;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A request handler run on the task pool. `Err` becomes a
/// `RequestFailed` response carrying the message.
type Handler<R> = fn(
    &<R as LspRequest>::Params,
    &Analysis,
) -> Result<<R as LspRequest>::Result, String>;

/// State managed by the main loop.
pub struct MainLoopState {
    /// Open documents and configuration shared with handlers.
    analysis: Analysis,
    /// Sender for outgoing LSP messages.
    sender: Sender<Message>,
    /// Workers answering requests.
    pool: TaskPool,
    /// Whether shutdown was requested.
    shutdown_requested: bool,
    /// Whether the exit notification arrived.
    exited: bool,
}

impl MainLoopState {
    /// Create the state with a fresh document store.
    pub fn new(sender: Sender<Message>, config: ServerConfig) -> io::Result<Self> {
        let parser = BasicParser::with_size_limit(config.max_document_bytes);
        let store = Arc::new(DocumentStore::with_parser(Arc::new(parser)));
        Self::with_store(sender, config, store)
    }

    /// Create the state around an existing store.
    pub fn with_store(
        sender: Sender<Message>,
        config: ServerConfig,
        store: Arc<DocumentStore>,
    ) -> io::Result<Self> {
        let pool = TaskPool::new(config.worker_threads)?;
        Ok(Self {
            analysis: Analysis::new(store, Arc::new(config)),
            sender,
            pool,
            shutdown_requested: false,
            exited: false,
        })
    }

    /// Handle one message from the client.
    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Request(req) => self.handle_request(req),
            Message::Notification(notif) => self.handle_notification(notif),
            Message::Response(resp) => {
                tracing::debug!("Ignoring client response {:?}", resp.id);
            }
        }
    }

    /// Handle an LSP request (expects response).
    fn handle_request(&mut self, req: Request) {
        if self.shutdown_requested {
            self.respond_err(
                req.id,
                ErrorCode::InvalidRequest,
                "server is shutting down".to_string(),
            );
            return;
        }

        match req.method.as_str() {
            Initialize::METHOD => self.handle_initialize(req),
            Shutdown::METHOD => {
                tracing::info!("Shutdown requested");
                self.shutdown_requested = true;
                self.send(Message::Response(Response::new_ok(
                    req.id,
                    serde_json::Value::Null,
                )));
            }
            GotoDefinition::METHOD => {
                self.spawn::<GotoDefinition>(req, |p, a| Ok(handle_goto_definition(p, a)));
            }
            HoverRequest::METHOD => self.spawn::<HoverRequest>(req, |p, a| Ok(handle_hover(p, a))),
            References::METHOD => self.spawn::<References>(req, |p, a| Ok(handle_references(p, a))),
            DocumentSymbolRequest::METHOD => {
                self.spawn::<DocumentSymbolRequest>(req, |p, a| Ok(handle_document_symbols(p, a)));
            }
            PrepareRenameRequest::METHOD => {
                self.spawn::<PrepareRenameRequest>(req, |p, a| Ok(handle_prepare_rename(p, a)));
            }
            Rename::METHOD => self.spawn::<Rename>(req, handle_rename),
            _ => {
                tracing::warn!("Unhandled request: {}", req.method);
                self.respond_err(
                    req.id,
                    ErrorCode::MethodNotFound,
                    format!("Unhandled request: {}", req.method),
                );
            }
        }
    }

    /// Answer `initialize` when the handshake was not done by the caller.
    fn handle_initialize(&mut self, req: Request) {
        let params: InitializeParams = match decode(req.params) {
            Ok(params) => params,
            Err(e) => {
                self.respond_err(req.id, ErrorCode::InvalidParams, e);
                return;
            }
        };
        match serde_json::to_value(crate::server::initialize_result(&params)) {
            Ok(value) => self.send(Message::Response(Response::new_ok(req.id, value))),
            Err(e) => self.respond_err(req.id, ErrorCode::InternalError, e.to_string()),
        }
    }

    /// Decode the params here, then run the handler on the task pool.
    fn spawn<R>(&self, req: Request, handler: Handler<R>)
    where
        R: LspRequest + 'static,
    {
        let id = req.id;
        let params: R::Params = match decode(req.params) {
            Ok(params) => params,
            Err(e) => {
                self.respond_err(id, ErrorCode::InvalidParams, e);
                return;
            }
        };

        let analysis = self.analysis.clone();
        let sender = self.sender.clone();
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&params, &analysis)));
            let response = match outcome {
                Ok(Ok(result)) => match serde_json::to_value(result) {
                    Ok(value) => Response::new_ok(id, value),
                    Err(e) => Response::new_err(id, ErrorCode::InternalError as i32, e.to_string()),
                },
                Ok(Err(message)) => Response::new_err(id, ErrorCode::RequestFailed as i32, message),
                Err(_) => {
                    tracing::error!("Handler for {} panicked", R::METHOD);
                    Response::new_err(
                        id,
                        ErrorCode::InternalError as i32,
                        format!("{} failed", R::METHOD),
                    )
                }
            };
            if let Err(e) = sender.send(Message::Response(response)) {
                tracing::error!("Failed to send response: {}", e);
            }
        });
    }

    /// Handle an LSP notification (no response).
    fn handle_notification(&mut self, notif: Notification) {
        match notif.method.as_str() {
            DidOpenTextDocument::METHOD => {
                if let Some(params) = self.decode_notification(notif) {
                    self.on_did_open(params);
                }
            }
            DidChangeTextDocument::METHOD => {
                if let Some(params) = self.decode_notification(notif) {
                    self.on_did_change(params);
                }
            }
            DidSaveTextDocument::METHOD => {
                if let Some(params) = self.decode_notification(notif) {
                    self.on_did_save(params);
                }
            }
            DidCloseTextDocument::METHOD => {
                if let Some(params) = self.decode_notification(notif) {
                    self.on_did_close(params);
                }
            }
            Initialized::METHOD => {
                tracing::info!("Client initialized");
            }
            Cancel::METHOD => {
                tracing::debug!("Cancellation is not supported; request runs to completion");
            }
            Exit::METHOD => {
                tracing::info!("Exit notification received");
                self.exited = true;
            }
            _ => {
                tracing::debug!("Unhandled notification: {}", notif.method);
            }
        }
    }

    fn decode_notification<P: DeserializeOwned>(&self, notif: Notification) -> Option<P> {
        match decode(notif.params) {
            Ok(params) => Some(params),
            Err(e) => {
                tracing::warn!("Malformed {} notification: {}", notif.method, e);
                None
            }
        }
    }

    /// Handle textDocument/didOpen notification.
    fn on_did_open(&mut self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        tracing::info!("Document opened: {}", document.uri.as_str());

        let uri = document_uri(&document.uri);
        if let Some(snapshot) =
            self.analysis
                .store()
                .open_versioned(&uri, &document.text, document.version)
        {
            self.publish_diagnostics(&document.uri, &snapshot);
        }
    }

    /// Handle textDocument/didChange notification.
    fn on_did_change(&mut self, params: DidChangeTextDocumentParams) {
        let document = params.text_document;

        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        tracing::debug!("Document changed: {}", document.uri.as_str());

        let uri = document_uri(&document.uri);
        if let Some(snapshot) =
            self.analysis
                .store()
                .update_versioned(&uri, &change.text, document.version)
        {
            self.publish_diagnostics(&document.uri, &snapshot);
        }
    }

    /// Handle textDocument/didSave notification.
    fn on_did_save(&mut self, params: DidSaveTextDocumentParams) {
        let Some(text) = params.text else {
            return;
        };
        tracing::debug!("Document saved: {}", params.text_document.uri.as_str());

        let uri = document_uri(&params.text_document.uri);
        let snapshot = self.analysis.store().update(&uri, &text);
        self.publish_diagnostics(&params.text_document.uri, &snapshot);
    }

    /// Handle textDocument/didClose notification.
    fn on_did_close(&mut self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("Document closed: {}", uri.as_str());

        self.analysis.store().close(&document_uri(&uri));
        self.send_diagnostics(&uri, Vec::new(), None);
    }

    /// Publish a snapshot's parse errors.
    fn publish_diagnostics(&self, uri: &Uri, snapshot: &DocumentSnapshot) {
        let diagnostics = parse_errors_to_diagnostics(snapshot);
        tracing::debug!(
            "Publishing {} diagnostics for {}",
            diagnostics.len(),
            uri.as_str()
        );
        self.send_diagnostics(uri, diagnostics, snapshot.editor_version());
    }

    /// Send diagnostics to the client.
    fn send_diagnostics(
        &self,
        uri: &Uri,
        diagnostics: Vec<lsp_types::Diagnostic>,
        version: Option<i32>,
    ) {
        let params = PublishDiagnosticsParams {
            uri: uri.clone(),
            diagnostics,
            version,
        };
        let notif = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
        self.send(Message::Notification(notif));
    }

    fn respond_err(&self, id: RequestId, code: ErrorCode, message: String) {
        self.send(Message::Response(Response::new_err(id, code as i32, message)));
    }

    /// Send a message to the client.
    fn send(&self, msg: Message) {
        if let Err(e) = self.sender.send(msg) {
            tracing::error!("Failed to send message: {}", e);
        }
    }
}

fn decode<P: DeserializeOwned>(params: serde_json::Value) -> Result<P, String> {
    serde_json::from_value(params).map_err(|e| e.to_string())
}

/// Run the main event loop until `exit` or until the client disconnects.
///
/// Returns whether `shutdown` was requested before the loop ended. Queued
/// requests are answered before this returns.
pub fn run_main_loop(
    receiver: Receiver<Message>,
    sender: Sender<Message>,
    config: ServerConfig,
) -> io::Result<bool> {
    let mut state = MainLoopState::new(sender, config)?;
    Ok(drive(&mut state, receiver))
}

/// Run the main event loop over an existing store.
pub fn run_main_loop_with_store(
    receiver: Receiver<Message>,
    sender: Sender<Message>,
    config: ServerConfig,
    store: Arc<DocumentStore>,
) -> io::Result<bool> {
    let mut state = MainLoopState::with_store(sender, config, store)?;
    Ok(drive(&mut state, receiver))
}

fn drive(state: &mut MainLoopState, receiver: Receiver<Message>) -> bool {
    tracing::info!("Main loop started");

    for msg in receiver {
        state.handle_message(msg);
        if state.exited {
            break;
        }
    }

    tracing::info!("Main loop ended");
    state.shutdown_requested
}
