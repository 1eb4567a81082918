//! Rename, definition and reference behaviour across open documents.

use basiclang_lsp::analysis::{
    compute_definition, compute_rename_edits, find_declaration, find_references, hover_text,
    word_at, RenameOutcome,
};
use basiclang_lsp::{DefinitionScope, DocumentStore, DocumentUri};
use basiclang_syntax::Span;

fn open(store: &DocumentStore, uri: &str, text: &str) -> DocumentUri {
    let uri = DocumentUri::from(uri);
    store.open(&uri, text);
    uri
}

#[test]
fn word_lookup_respects_token_boundaries() {
    let store = DocumentStore::new();
    let uri = open(&store, "file:///w.bas", "\n\n    Name = 1\n");
    let snapshot = store.get(&uri).unwrap();

    for column in 5..=8 {
        assert_eq!(word_at(&snapshot, 3, column), Some("Name"));
    }
    assert_eq!(word_at(&snapshot, 3, 4), None);
    assert_eq!(word_at(&snapshot, 3, 9), None);
}

#[test]
fn rename_matches_every_casing() {
    let store = DocumentStore::new();
    let uri = open(&store, "file:///case.bas", "Foo\nfoo\nFOO\n");

    let plan = compute_rename_edits(&store, &uri, "foo", "bar")
        .into_plan()
        .unwrap();
    let edits = plan.edits(&uri).unwrap();
    let spans: Vec<Span> = edits.iter().map(|e| e.span).collect();
    assert_eq!(
        spans,
        [
            Span::on_line(1, 1, 3),
            Span::on_line(2, 1, 3),
            Span::on_line(3, 1, 3),
        ]
    );
    assert!(edits.iter().all(|e| e.new_text == "bar"));
}

#[test]
fn private_rename_stays_in_origin() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///a.bas",
        "Private Sub Helper()\nEnd Sub\nCall Helper\n",
    );
    let b = open(&store, "file:///b.bas", "Call Helper\nCall helper\n");

    let plan = compute_rename_edits(&store, &a, "Helper", "Support")
        .into_plan()
        .unwrap();
    assert!(plan.contains(&a));
    assert!(!plan.contains(&b));
    assert_eq!(plan.document_count(), 1);
}

#[test]
fn public_rename_reaches_every_open_document_that_uses_it() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///a.bas",
        "Public Function Compute(x)\n  Compute = x * 2\nEnd Function\n",
    );
    let b = open(&store, "file:///b.bas", "y = Compute(3)\n");
    let c = open(&store, "file:///c.bas", "z = compute(4) + COMPUTE(5)\n");
    let d = open(&store, "file:///d.bas", "Dim unrelated\n");

    let plan = compute_rename_edits(&store, &a, "Compute", "Calculate")
        .into_plan()
        .unwrap();
    assert_eq!(plan.document_count(), 3);
    assert_eq!(plan.edits(&a).map(<[_]>::len), Some(2));
    assert_eq!(plan.edits(&b).map(<[_]>::len), Some(1));
    assert_eq!(plan.edits(&c).map(<[_]>::len), Some(2));
    assert!(!plan.contains(&d));
}

#[test]
fn visibility_is_decided_by_the_origin_document() {
    let store = DocumentStore::new();
    // `a` only uses the name; the public declaration lives in `b`.
    let a = open(&store, "file:///a.bas", "Call Shared\n");
    let b = open(&store, "file:///b.bas", "Public Sub Shared()\nEnd Sub\n");

    let plan = compute_rename_edits(&store, &a, "Shared", "Common")
        .into_plan()
        .unwrap();
    assert!(plan.contains(&a));
    assert!(!plan.contains(&b));
}

#[test]
fn rename_of_absent_name_is_a_no_op() {
    let store = DocumentStore::new();
    let a = open(&store, "file:///a.bas", "Dim x\n");
    assert_eq!(
        compute_rename_edits(&store, &a, "Nowhere", "Somewhere"),
        RenameOutcome::NoOccurrences
    );
}

#[test]
fn definition_then_close() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///a.bas",
        "Private Sub Setup()\nEnd Sub\nCall Setup\n",
    );

    let location = compute_definition(&store, &a, "setup", DefinitionScope::Document).unwrap();
    assert_eq!(location.uri, a);
    assert_eq!(location.span.start.line, 1);

    store.close(&a);
    assert!(compute_definition(&store, &a, "setup", DefinitionScope::Document).is_none());
    assert!(store.get(&a).is_none());
    assert_eq!(
        compute_rename_edits(&store, &a, "Setup", "Init"),
        RenameOutcome::DocumentNotOpen
    );
    assert!(find_references(&store, &a, "Setup", true).is_empty());
}

#[test]
fn closed_documents_drop_out_of_public_renames() {
    let store = DocumentStore::new();
    let a = open(&store, "file:///a.bas", "Class Widget\nEnd Class\n");
    let b = open(&store, "file:///b.bas", "Dim w As Widget\n");

    assert_eq!(
        compute_rename_edits(&store, &a, "Widget", "Gadget")
            .into_plan()
            .unwrap()
            .document_count(),
        2
    );

    store.close(&b);
    let plan = compute_rename_edits(&store, &a, "Widget", "Gadget")
        .into_plan()
        .unwrap();
    assert_eq!(plan.document_count(), 1);
    assert!(plan.contains(&a));
}

#[test]
fn duplicate_declarations_resolve_to_the_first() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///a.bas",
        "Public Sub Run()\nEnd Sub\nPrivate Sub Run()\nEnd Sub\n",
    );

    let location = compute_definition(&store, &a, "Run", DefinitionScope::Document).unwrap();
    assert_eq!(location.span.start.line, 1);
}

#[test]
fn edits_in_one_document_never_overlap() {
    let store = DocumentStore::new();
    let a = open(&store, "file:///a.bas", "ab = ab + ab: ab = AB\n");

    let plan = compute_rename_edits(&store, &a, "ab", "abc")
        .into_plan()
        .unwrap();
    let mut spans: Vec<Span> = plan.edits(&a).unwrap().iter().map(|e| e.span).collect();
    assert_eq!(spans.len(), 5);
    spans.sort_by_key(|s| s.start);
    assert!(spans.windows(2).all(|w| !w[0].overlaps(&w[1])));
}

#[test]
fn hover_and_definition_share_the_declaration() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///calc.bas",
        "' calculator\nPublic Function Compute(a, b) As Integer\nEnd Function\n",
    );
    let snapshot = store.get(&a).unwrap();

    for name in ["Compute", "compute", "COMPUTE"] {
        let declaration = find_declaration(&snapshot, name).unwrap();
        assert_eq!(declaration.name(), "Compute");
    }
    let text = hover_text(&snapshot, "compute").unwrap();
    assert!(text.contains("Public Function Compute(a, b) As Integer"));
    assert!(text.contains("2 parameter(s)"));

    let location = compute_definition(&store, &a, "compute", DefinitionScope::Document).unwrap();
    assert_eq!(location.span.start.line, 2);
    assert_eq!(location.span.end.line, 3);

    store.close(&a);
    assert!(compute_definition(&store, &a, "compute", DefinitionScope::Document).is_none());
    // A snapshot taken before close still answers.
    assert!(find_declaration(&snapshot, "Compute").is_some());
}

#[test]
fn carriage_return_line_endings_match_editor_lines() {
    let store = DocumentStore::new();
    let a = open(
        &store,
        "file:///cr.bas",
        "Public Sub Foo()\rEnd Sub\rCall Foo\r",
    );
    let snapshot = store.get(&a).unwrap();

    assert_eq!(word_at(&snapshot, 3, 6), Some("Foo"));
    assert_eq!(snapshot.line(3).as_deref(), Some("Call Foo"));
    let text = hover_text(&snapshot, "foo").unwrap();
    assert!(text.contains("Public Sub Foo()"));

    let plan = compute_rename_edits(&store, &a, "Foo", "Bar")
        .into_plan()
        .unwrap();
    let spans: Vec<Span> = plan.edits(&a).unwrap().iter().map(|e| e.span).collect();
    assert_eq!(spans, [Span::on_line(1, 12, 3), Span::on_line(3, 6, 3)]);
}
