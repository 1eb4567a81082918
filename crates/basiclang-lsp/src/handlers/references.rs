//! Find-references handler.

use lsp_types::{Location, ReferenceParams};

use super::utils::{document_uri, to_lsp_location, to_source_position};
use crate::analysis::Analysis;

/// Handle a find references request.
pub fn handle_references(params: &ReferenceParams, analysis: &Analysis) -> Option<Vec<Location>> {
    let position = &params.text_document_position;
    let uri = document_uri(&position.text_document.uri);
    let (line, column) = to_source_position(position.position);

    let locations: Vec<Location> = analysis
        .references(&uri, line, column, params.context.include_declaration)
        .iter()
        .filter_map(to_lsp_location)
        .collect();

    if locations.is_empty() {
        None
    } else {
        Some(locations)
    }
}
