//! Integration tests for the parser crate.
//!
//! Tests cover whole documents, error recovery, and robustness against
//! arbitrary input.

use basiclang_syntax::{
    parse, Access, BasicParser, Declaration, DeclarationKind, ParseErrorKind, ParseResult,
    SourceParser, TokenKind,
};
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_ok(source: &str) -> ParseResult {
    let result = parse(source);
    assert!(
        result.errors.is_empty(),
        "expected no errors, got: {:?}",
        result.errors
    );
    result
}

fn names(declarations: &[Declaration]) -> Vec<&str> {
    declarations.iter().map(Declaration::name).collect()
}

const INVENTORY: &str = r#"' Inventory module
Public Class Item
    Public Name As String
    Private price As Double

    Public Function Total(ByVal qty As Integer) As Double
        Dim subtotal As Double
        subtotal = price * qty
        Total = subtotal
    End Function
End Class

Private Sub Helper()
    Print "helping"
End Sub

Function Compute(a, b)
    Compute = a + b
End Function

Dim shared As Item
"#;

// ============================================================================
// Whole Documents
// ============================================================================

#[test]
fn test_parse_module() {
    let result = parse_ok(INVENTORY);
    assert_eq!(
        names(&result.declarations),
        ["Item", "Helper", "Compute", "shared"]
    );

    let kinds: Vec<_> = result.declarations.iter().map(Declaration::kind).collect();
    assert_eq!(
        kinds,
        [
            DeclarationKind::Class,
            DeclarationKind::Subroutine,
            DeclarationKind::Function,
            DeclarationKind::Variable
        ]
    );

    let item = &result.declarations[0];
    assert_eq!(item.access(), Access::Public);
    assert_eq!(names(item.children()), ["Name", "price", "Total"]);
    assert_eq!(item.children()[2].children().len(), 1);
    assert_eq!(item.span().start.line, 2);
    assert_eq!(item.span().end.line, 11);

    // Undeclared access defaults to private.
    assert_eq!(result.declarations[2].access(), Access::Private);
}

#[test]
fn test_keywords_are_case_insensitive() {
    let result = parse_ok("PUBLIC FUNCTION shout()\nEND FUNCTION\nclass quiet\nend class\n");
    assert_eq!(names(&result.declarations), ["shout", "quiet"]);
    assert_eq!(result.declarations[0].access(), Access::Public);
}

#[test]
fn test_tokens_cover_whole_document() {
    let result = parse(INVENTORY);
    assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Comment));
    let identifiers = result
        .tokens
        .iter()
        .filter(|t| t.names("compute"))
        .count();
    assert_eq!(identifiers, 2);
}

#[test]
fn test_duplicate_top_level_names_are_kept_in_order() {
    let result = parse_ok("Sub Dup()\nEnd Sub\nFunction dup()\nEnd Function\n");
    assert_eq!(names(&result.declarations), ["Dup", "dup"]);
}

// ============================================================================
// Error Recovery
// ============================================================================

#[test]
fn test_recovery_keeps_later_declarations() {
    let source = "Class Broken\n  Sub Inner()\nEnd Class\nPublic Sub After()\nEnd Sub\n";
    let result = parse(source);
    assert_eq!(names(&result.declarations), ["Broken", "After"]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0].kind,
        ParseErrorKind::MismatchedEnd { .. }
    ));
}

#[test]
fn test_unterminated_at_eof() {
    let result = parse("Public Class Open\n  Dim x\n");
    assert_eq!(result.declarations.len(), 1);
    assert_eq!(result.declarations[0].children().len(), 1);
    assert_eq!(
        result.errors[0].kind,
        ParseErrorKind::UnterminatedBlock(DeclarationKind::Class)
    );
}

#[test]
fn test_lexical_errors_do_not_stop_scanning() {
    let result = parse("Sub A()\n  x = ? \"oops\nEnd Sub\n");
    assert_eq!(names(&result.declarations), ["A"]);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_parser_trait_object() {
    let parser: Box<dyn SourceParser> = Box::new(BasicParser::with_size_limit(1024));
    let result = parser.parse(INVENTORY).unwrap();
    assert_eq!(result.declarations.len(), 4);
}

// ============================================================================
// Robustness
// ============================================================================

proptest! {
    #[test]
    fn test_parse_never_panics(source in "\\PC*") {
        let _ = parse(&source);
    }

    #[test]
    fn test_parse_never_panics_on_keyword_soup(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "Class", "End", "Function", "Sub", "Public", "Private", "Dim", "As",
                "(", ")", ",", ":", "\n", "x", "y", "\"", "'", "New",
            ]),
            0..64,
        )
    ) {
        let source = words.join(" ");
        let result = parse(&source);
        for token in &result.tokens {
            prop_assert!(token.line >= 1 && token.column >= 1);
        }
    }
}
