//! Main LSP server implementation.

use crate::config::ServerConfig;
use crate::main_loop::run_main_loop;
use lsp_server::{Connection, ProtocolError};
use lsp_types::{
    HoverProviderCapability, InitializeParams, InitializeResult, OneOf, PositionEncodingKind,
    RenameOptions, SaveOptions, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextDocumentSyncSaveOptions,
};
use thiserror::Error;

/// Errors that end the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The client broke the protocol during the handshake.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// `initialize` parameters could not be decoded.
    #[error("invalid initialize params: {0}")]
    Json(#[from] serde_json::Error),
    /// Transport or thread failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The client sent `exit` (or hung up) without `shutdown` first.
    #[error("client exited without requesting shutdown")]
    ExitWithoutShutdown,
}

/// Capabilities advertised to the client.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(true),
                })),
                ..Default::default()
            },
        )),
        definition_provider: Some(OneOf::Left(true)),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        references_provider: Some(OneOf::Left(true)),
        document_symbol_provider: Some(OneOf::Left(true)),
        rename_provider: Some(OneOf::Right(RenameOptions {
            prepare_provider: Some(true),
            work_done_progress_options: Default::default(),
        })),
        ..Default::default()
    }
}

/// Character offsets count chars, so UTF-32 when the client offers it.
/// Otherwise the protocol default, UTF-16, which only differs outside the
/// Basic Multilingual Plane.
pub fn negotiate_position_encoding(params: &InitializeParams) -> PositionEncodingKind {
    let offered = params
        .capabilities
        .general
        .as_ref()
        .and_then(|general| general.position_encodings.as_deref())
        .unwrap_or_default();
    if offered.contains(&PositionEncodingKind::UTF32) {
        PositionEncodingKind::UTF32
    } else {
        PositionEncodingKind::UTF16
    }
}

/// The `initialize` response for a client.
pub fn initialize_result(params: &InitializeParams) -> InitializeResult {
    InitializeResult {
        capabilities: ServerCapabilities {
            position_encoding: Some(negotiate_position_encoding(params)),
            ..server_capabilities()
        },
        server_info: Some(ServerInfo {
            name: "basiclang-lsp".to_string(),
            version: Some(crate::VERSION.to_string()),
        }),
    }
}

/// The LSP server.
pub struct Server {
    /// Connection to the LSP client.
    connection: Connection,
    /// Initialize parameters from client.
    init_params: InitializeParams,
}

impl Server {
    /// Create a new LSP server from an initialized connection.
    pub fn new(connection: Connection, init_params: InitializeParams) -> Self {
        Self {
            connection,
            init_params,
        }
    }

    /// Run the server's main loop. Returns whether the client requested
    /// shutdown before leaving.
    pub fn run(self) -> Result<bool, ServerError> {
        tracing::info!("Starting BasicLang Language Server v{}", crate::VERSION);

        if let Some(folder) = self
            .init_params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
        {
            tracing::info!("Workspace root: {}", folder.uri.as_str());
        }

        let config =
            ServerConfig::from_initialization_options(self.init_params.initialization_options.as_ref());
        tracing::debug!("Effective configuration: {:?}", config);

        let (sender, receiver) = (self.connection.sender, self.connection.receiver);
        let clean = run_main_loop(receiver, sender, config)?;

        tracing::info!("Server shutdown complete");
        Ok(clean)
    }
}

/// Start the LSP server using stdio transport.
pub fn start_stdio() -> Result<(), ServerError> {
    tracing::info!("Starting LSP server on stdio");

    let (connection, io_threads) = Connection::stdio();

    // Wait for initialize request
    let (id, params) = connection.initialize_start()?;
    let init_params: InitializeParams = serde_json::from_value(params)?;

    let init_result = initialize_result(&init_params);
    tracing::debug!(
        "Position encoding: {:?}",
        init_result.capabilities.position_encoding
    );

    // Complete initialization handshake
    connection.initialize_finish(id, serde_json::to_value(init_result)?)?;

    tracing::info!("LSP initialized successfully");

    let clean = Server::new(connection, init_params).run()?;

    // Wait for IO threads to finish
    io_threads.join()?;

    if clean {
        Ok(())
    } else {
        Err(ServerError::ExitWithoutShutdown)
    }
}
