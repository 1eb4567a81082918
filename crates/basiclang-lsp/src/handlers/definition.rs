//! Go-to-definition handler.

use lsp_types::{GotoDefinitionParams, GotoDefinitionResponse};

use super::utils::{document_uri, to_lsp_location, to_source_position};
use crate::analysis::Analysis;

/// Handle a go-to-definition request.
pub fn handle_goto_definition(
    params: &GotoDefinitionParams,
    analysis: &Analysis,
) -> Option<GotoDefinitionResponse> {
    let position = &params.text_document_position_params;
    let uri = document_uri(&position.text_document.uri);
    let (line, column) = to_source_position(position.position);

    let location = analysis.definition(&uri, line, column)?;
    to_lsp_location(&location).map(GotoDefinitionResponse::Scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::store::DocumentStore;
    use lsp_types::{Position, TextDocumentIdentifier, TextDocumentPositionParams, Uri};
    use std::str::FromStr;
    use std::sync::Arc;

    fn params(uri: &str, line: u32, character: u32) -> GotoDefinitionParams {
        GotoDefinitionParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: Uri::from_str(uri).unwrap(),
                },
                position: Position::new(line, character),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }
    }

    #[test]
    fn test_goto_definition_local() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        analysis.store().open(
            &"file:///a.bas".into(),
            "Private Function Twice(n)\n  Twice = n * 2\nEnd Function\nx = Twice(4)\n",
        );

        let response = handle_goto_definition(&params("file:///a.bas", 3, 5), &analysis);
        let Some(GotoDefinitionResponse::Scalar(location)) = response else {
            panic!("expected a single location, got {response:?}");
        };
        assert_eq!(location.uri.as_str(), "file:///a.bas");
        assert_eq!(location.range.start, Position::new(0, 0));
        assert_eq!(location.range.end.line, 2);
    }

    #[test]
    fn test_goto_definition_on_keyword() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        analysis.store().open(&"file:///a.bas".into(), "Dim x\n");
        assert!(handle_goto_definition(&params("file:///a.bas", 0, 1), &analysis).is_none());
    }
}
