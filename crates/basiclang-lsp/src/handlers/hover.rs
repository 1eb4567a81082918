//! Hover handler showing a declaration's signature.

use lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind};

use super::utils::{document_uri, to_lsp_range, to_source_position};
use crate::analysis::Analysis;

/// Handle a hover request.
pub fn handle_hover(params: &HoverParams, analysis: &Analysis) -> Option<Hover> {
    let position = &params.text_document_position_params;
    let uri = document_uri(&position.text_document.uri);
    let (line, column) = to_source_position(position.position);

    let (span, text) = analysis.hover(&uri, line, column)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: text,
        }),
        range: Some(to_lsp_range(span)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::store::DocumentStore;
    use lsp_types::{Position, TextDocumentIdentifier, TextDocumentPositionParams, Uri};
    use std::str::FromStr;
    use std::sync::Arc;

    fn params(line: u32, character: u32) -> HoverParams {
        HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: Uri::from_str("file:///h.bas").unwrap(),
                },
                position: Position::new(line, character),
            },
            work_done_progress_params: Default::default(),
        }
    }

    #[test]
    fn test_hover_on_usage() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        analysis.store().open(
            &"file:///h.bas".into(),
            "Public Function Area(w, h) As Double\nEnd Function\ny = Area(1, 2)\n",
        );

        let hover = handle_hover(&params(2, 4), &analysis).unwrap();
        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markdown");
        };
        assert_eq!(markup.kind, MarkupKind::Markdown);
        assert!(markup.value.contains("Public Function Area(w, h) As Double"));
        assert_eq!(
            hover.range.map(|r| (r.start, r.end)),
            Some((Position::new(2, 4), Position::new(2, 8)))
        );
    }

    #[test]
    fn test_hover_on_undeclared_name() {
        let analysis = Analysis::new(
            Arc::new(DocumentStore::new()),
            Arc::new(ServerConfig::default()),
        );
        analysis.store().open(&"file:///h.bas".into(), "y = mystery\n");
        assert!(handle_hover(&params(0, 5), &analysis).is_none());
    }
}
