//! Document symbols handler for the outline view.
//!
//! The outline is flat: nested declarations carry their container's name
//! instead of being children.

use basiclang_syntax::DeclarationKind;
use lsp_types::{DocumentSymbolParams, DocumentSymbolResponse, SymbolInformation, SymbolKind};

use super::utils::{document_uri, to_lsp_range};
use crate::analysis::{Analysis, OutlineEntry};

/// Handle a document symbols request.
pub fn handle_document_symbols(
    params: &DocumentSymbolParams,
    analysis: &Analysis,
) -> Option<DocumentSymbolResponse> {
    let uri = &params.text_document.uri;
    analysis.snapshot(&document_uri(uri))?;

    let symbols: Vec<SymbolInformation> = analysis
        .outline(&document_uri(uri))
        .iter()
        .map(|entry| to_symbol_information(entry, uri))
        .collect();

    Some(DocumentSymbolResponse::Flat(symbols))
}

#[allow(deprecated)] // SymbolInformation::deprecated is deprecated but required
fn to_symbol_information(entry: &OutlineEntry, uri: &lsp_types::Uri) -> SymbolInformation {
    SymbolInformation {
        name: entry.name.clone(),
        kind: symbol_kind(entry),
        tags: None,
        deprecated: None,
        location: lsp_types::Location {
            uri: uri.clone(),
            range: to_lsp_range(entry.span),
        },
        container_name: entry.container.clone(),
    }
}

fn symbol_kind(entry: &OutlineEntry) -> SymbolKind {
    match entry.kind {
        DeclarationKind::Class => SymbolKind::CLASS,
        DeclarationKind::Function | DeclarationKind::Subroutine if entry.container.is_some() => {
            SymbolKind::METHOD
        }
        DeclarationKind::Function | DeclarationKind::Subroutine => SymbolKind::FUNCTION,
        DeclarationKind::Variable if entry.container.is_some() => SymbolKind::FIELD,
        DeclarationKind::Variable => SymbolKind::VARIABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::store::DocumentStore;
    use lsp_types::{TextDocumentIdentifier, Uri};
    use std::str::FromStr;
    use std::sync::Arc;

    fn params(uri: &str) -> DocumentSymbolParams {
        DocumentSymbolParams {
            text_document: TextDocumentIdentifier {
                uri: Uri::from_str(uri).unwrap(),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }
    }

    #[test]
    fn test_outline_symbols() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        analysis.store().open(
            &"file:///o.bas".into(),
            "Class Stack\n  Dim items\n  Public Sub Push(x)\n  End Sub\nEnd Class\nDim depth\n",
        );

        let Some(DocumentSymbolResponse::Flat(symbols)) =
            handle_document_symbols(&params("file:///o.bas"), &analysis)
        else {
            panic!("expected flat symbols");
        };
        let rows: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind, s.container_name.as_deref()))
            .collect();
        assert_eq!(
            rows,
            [
                ("Stack", SymbolKind::CLASS, None),
                ("items", SymbolKind::FIELD, Some("Stack")),
                ("Push", SymbolKind::METHOD, Some("Stack")),
                ("depth", SymbolKind::VARIABLE, None),
            ]
        );
    }

    #[test]
    fn test_unknown_document() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        assert!(handle_document_symbols(&params("file:///none.bas"), &analysis).is_none());
    }
}
