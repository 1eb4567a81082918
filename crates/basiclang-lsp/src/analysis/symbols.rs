//! Declaration lookup within a single snapshot.
//!
//! Only top-level `Class`, `Function` and `Sub` declarations are
//! addressable by name. Top-level variables and anything nested are
//! invisible to lookup, though they still appear in the outline.

use basiclang_syntax::{Access, Declaration, DeclarationKind, Span};

use crate::snapshot::{DocumentSnapshot, DocumentUri};

/// A span inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Document containing the span.
    pub uri: DocumentUri,
    /// The span itself.
    pub span: Span,
}

/// One row of a document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Declared name.
    pub name: String,
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// Declared access.
    pub access: Access,
    /// Whole declaration.
    pub span: Span,
    /// Just the name.
    pub name_span: Span,
    /// Name of the enclosing declaration, if nested.
    pub container: Option<String>,
}

/// First top-level `Class`/`Function`/`Sub` whose name matches, ignoring
/// case.
pub fn find_declaration<'a>(snapshot: &'a DocumentSnapshot, name: &str) -> Option<&'a Declaration> {
    snapshot
        .declarations()
        .iter()
        .filter(|d| d.kind() != DeclarationKind::Variable)
        .find(|d| d.is_named(name))
}

/// Whether the declaration can be seen from other documents.
///
/// Classes always can; functions and subroutines only when declared
/// `Public`.
pub fn is_exported(declaration: &Declaration) -> bool {
    match declaration.kind() {
        DeclarationKind::Class => true,
        DeclarationKind::Function | DeclarationKind::Subroutine => {
            declaration.access() == Access::Public
        }
        DeclarationKind::Variable => false,
    }
}

/// Whether `name` resolves to an exported declaration in this snapshot.
/// Unknown names are private.
pub fn is_public(snapshot: &DocumentSnapshot, name: &str) -> bool {
    find_declaration(snapshot, name).is_some_and(is_exported)
}

/// Where `name` is declared in this snapshot.
pub fn definition_location(snapshot: &DocumentSnapshot, name: &str) -> Option<Location> {
    find_declaration(snapshot, name).map(|d| Location {
        uri: snapshot.uri().clone(),
        span: d.span(),
    })
}

/// Markdown hover text for the declaration of `name`.
pub fn hover_text(snapshot: &DocumentSnapshot, name: &str) -> Option<String> {
    let declaration = find_declaration(snapshot, name)?;
    let header = declaration.header();

    let signature = snapshot
        .line(header.span.start.line)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| format!("{} {}", declaration.kind(), header.name));

    let visibility = if is_exported(declaration) {
        "visible to all open documents"
    } else {
        "private to this document"
    };

    let detail = match declaration {
        Declaration::Class { members, .. } => {
            format!("**Class** with {} member(s), {}", members.len(), visibility)
        }
        Declaration::Function {
            parameters,
            return_type,
            ..
        } => {
            let returns = return_type
                .as_deref()
                .map(|t| format!(" returning `{t}`"))
                .unwrap_or_default();
            format!(
                "**Function** taking {} parameter(s){}, {}",
                parameters.len(),
                returns,
                visibility
            )
        }
        Declaration::Subroutine { parameters, .. } => format!(
            "**Sub** taking {} parameter(s), {}",
            parameters.len(),
            visibility
        ),
        Declaration::Variable { .. } => return None,
    };

    Some(format!("```basic\n{signature}\n```\n\n{detail}"))
}

/// Every declaration in the document, pre-order, with its container.
pub fn document_outline(snapshot: &DocumentSnapshot) -> Vec<OutlineEntry> {
    fn walk(declarations: &[Declaration], container: Option<&str>, out: &mut Vec<OutlineEntry>) {
        for declaration in declarations {
            let header = declaration.header();
            out.push(OutlineEntry {
                name: header.name.clone(),
                kind: declaration.kind(),
                access: header.access,
                span: header.span,
                name_span: header.name_span,
                container: container.map(str::to_string),
            });
            walk(declaration.children(), Some(&header.name), out);
        }
    }

    let mut entries = Vec::new();
    walk(snapshot.declarations(), None, &mut entries);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use basiclang_syntax::parse;

    const SOURCE: &str = "\
Public Class Account
  Dim balance As Long
  Public Sub Deposit(amount)
  End Sub
End Class

Private Function helper(a, b) As Long
  helper = a + b
End Function

Public Sub Main()
End Sub

Dim total
";

    fn snapshot(text: &str) -> DocumentSnapshot {
        DocumentSnapshot::new(DocumentUri::from("file:///s.bas"), text, parse(text), 1, None)
    }

    #[test]
    fn test_find_declaration_case_insensitive() {
        let snap = snapshot(SOURCE);
        assert_eq!(find_declaration(&snap, "ACCOUNT").map(|d| d.name()), Some("Account"));
        assert_eq!(find_declaration(&snap, "Helper").map(|d| d.name()), Some("helper"));
    }

    #[test]
    fn test_variables_and_members_not_addressable() {
        let snap = snapshot(SOURCE);
        assert!(find_declaration(&snap, "total").is_none());
        assert!(find_declaration(&snap, "Deposit").is_none());
        assert!(find_declaration(&snap, "balance").is_none());
    }

    #[test]
    fn test_visibility() {
        let snap = snapshot(SOURCE);
        assert!(is_public(&snap, "Account"));
        assert!(is_public(&snap, "main"));
        assert!(!is_public(&snap, "helper"));
        assert!(!is_public(&snap, "total"));
        assert!(!is_public(&snap, "missing"));
    }

    #[test]
    fn test_class_is_public_without_modifier() {
        let snap = snapshot("Class Shape\nEnd Class\n");
        assert!(is_public(&snap, "Shape"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let snap = snapshot("Private Sub Run()\nEnd Sub\nPublic Sub run()\nEnd Sub\n");
        let declaration = find_declaration(&snap, "RUN").unwrap();
        assert_eq!(declaration.span().start.line, 1);
        assert!(!is_public(&snap, "Run"));
    }

    #[test]
    fn test_definition_location() {
        let snap = snapshot(SOURCE);
        let location = definition_location(&snap, "main").unwrap();
        assert_eq!(location.uri.as_str(), "file:///s.bas");
        assert_eq!(location.span.start.line, 11);
        assert!(definition_location(&snap, "nope").is_none());
    }

    #[test]
    fn test_hover_text() {
        let snap = snapshot(SOURCE);
        let text = hover_text(&snap, "helper").unwrap();
        assert!(text.starts_with("```basic\nPrivate Function helper(a, b) As Long\n```"));
        assert!(text.contains("2 parameter(s)"));
        assert!(text.contains("returning `Long`"));
        assert!(text.contains("private to this document"));

        let text = hover_text(&snap, "Account").unwrap();
        assert!(text.contains("**Class**"));
        assert!(text.contains("visible to all open documents"));

        assert!(hover_text(&snap, "total").is_none());
    }

    #[test]
    fn test_document_outline() {
        let snap = snapshot(SOURCE);
        let outline = document_outline(&snap);
        let rows: Vec<_> = outline
            .iter()
            .map(|e| (e.name.as_str(), e.container.as_deref()))
            .collect();
        assert_eq!(
            rows,
            [
                ("Account", None),
                ("balance", Some("Account")),
                ("Deposit", Some("Account")),
                ("helper", None),
                ("Main", None),
                ("total", None),
            ]
        );
    }
}
