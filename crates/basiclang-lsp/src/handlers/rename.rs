//! Rename handlers.
//!
//! A rename reaches every open document only when the renamed name is
//! exported from the document the request was made in.

use lsp_types::{
    PrepareRenameResponse, RenameParams, TextDocumentPositionParams, TextEdit, Uri, WorkspaceEdit,
};
use std::collections::HashMap;

use super::utils::{document_uri, to_lsp_range, to_source_position};
use crate::analysis::{Analysis, EditPlan, RenameOutcome};

/// Handle a prepare rename request (check if rename is valid at position).
pub fn handle_prepare_rename(
    params: &TextDocumentPositionParams,
    analysis: &Analysis,
) -> Option<PrepareRenameResponse> {
    let uri = document_uri(&params.text_document.uri);
    let (line, column) = to_source_position(params.position);

    let (span, placeholder) = analysis.prepare_rename(&uri, line, column)?;
    Some(PrepareRenameResponse::RangeWithPlaceholder {
        range: to_lsp_range(span),
        placeholder,
    })
}

/// Handle a rename request.
///
/// `Ok(None)` means there was nothing to rename; `Err` carries a message
/// for the client when the new name is unusable.
pub fn handle_rename(
    params: &RenameParams,
    analysis: &Analysis,
) -> Result<Option<WorkspaceEdit>, String> {
    let position = &params.text_document_position;
    let uri = document_uri(&position.text_document.uri);
    let (line, column) = to_source_position(position.position);

    match analysis.rename(&uri, line, column, &params.new_name) {
        RenameOutcome::Planned(plan) => Ok(Some(to_workspace_edit(plan))),
        RenameOutcome::InvalidNewName(name) => {
            Err(format!("`{name}` is not a valid BasicLang identifier"))
        }
        RenameOutcome::NoOccurrences | RenameOutcome::NoSymbol | RenameOutcome::DocumentNotOpen => {
            Ok(None)
        }
    }
}

/// Convert an edit plan to a workspace edit.
#[allow(clippy::mutable_key_type)] // Uri is required as key by LSP WorkspaceEdit API
pub fn to_workspace_edit(plan: EditPlan) -> WorkspaceEdit {
    let mut changes: HashMap<Uri, Vec<TextEdit>> = HashMap::new();
    for (uri, edits) in plan {
        let Some(uri) = uri.to_lsp() else {
            tracing::warn!("Skipping edits for unparseable URI {}", uri);
            continue;
        };
        changes.insert(
            uri,
            edits
                .into_iter()
                .map(|edit| TextEdit {
                    range: to_lsp_range(edit.span),
                    new_text: edit.new_text,
                })
                .collect(),
        );
    }

    WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    }
}
