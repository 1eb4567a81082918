//! Declarations: the addressable, symbol-defining nodes of a document.
//!
//! Every variant shares a [`SymbolHeader`]; the analysis layer only ever
//! needs the header, the kind, and the nested declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::Span;

/// Visibility of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Visible from other documents.
    Public,
    /// Visible only inside the declaring document. The default.
    #[default]
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("Public"),
            Self::Private => f.write_str("Private"),
        }
    }
}

/// Declaration variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// `Class ... End Class`
    Class,
    /// `Function ... End Function`
    Function,
    /// `Sub ... End Sub`
    Subroutine,
    /// `Dim`, `Const`, or an access-qualified field.
    Variable,
}

impl DeclarationKind {
    /// The keyword that opens (and, after `End`, closes) this kind of block.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Function => "Function",
            Self::Subroutine => "Sub",
            Self::Variable => "Dim",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Name, visibility and location shared by every declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHeader {
    /// Declared name, as written.
    pub name: String,
    /// Visibility; `Private` unless the source says otherwise.
    pub access: Access,
    /// Whole declaration, from the first header token to the end of its block.
    pub span: Span,
    /// The name token alone.
    pub name_span: Span,
}

/// A parameter of a function or subroutine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// `As` type, if given.
    pub type_name: Option<String>,
    /// Location of the name.
    pub span: Span,
}

/// A symbol-defining AST node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    /// A class and its members.
    Class {
        /// Shared header.
        header: SymbolHeader,
        /// Fields and methods, in source order.
        members: Vec<Declaration>,
    },
    /// A value-returning routine.
    Function {
        /// Shared header.
        header: SymbolHeader,
        /// Declared parameters.
        parameters: Vec<Parameter>,
        /// `As` return type, if given.
        return_type: Option<String>,
        /// Local `Dim` declarations.
        locals: Vec<Declaration>,
    },
    /// A routine without a return value.
    Subroutine {
        /// Shared header.
        header: SymbolHeader,
        /// Declared parameters.
        parameters: Vec<Parameter>,
        /// Local `Dim` declarations.
        locals: Vec<Declaration>,
    },
    /// A variable, constant or field.
    Variable {
        /// Shared header.
        header: SymbolHeader,
        /// `As` type, if given.
        type_name: Option<String>,
    },
}

impl Declaration {
    /// The shared header.
    #[must_use]
    pub const fn header(&self) -> &SymbolHeader {
        match self {
            Self::Class { header, .. }
            | Self::Function { header, .. }
            | Self::Subroutine { header, .. }
            | Self::Variable { header, .. } => header,
        }
    }

    /// Variant tag.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::Class { .. } => DeclarationKind::Class,
            Self::Function { .. } => DeclarationKind::Function,
            Self::Subroutine { .. } => DeclarationKind::Subroutine,
            Self::Variable { .. } => DeclarationKind::Variable,
        }
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// Visibility.
    #[must_use]
    pub const fn access(&self) -> Access {
        self.header().access
    }

    /// Whole-declaration span.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.header().span
    }

    /// Whether this declaration is named `name`, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    /// Nested declarations (class members or routine locals).
    #[must_use]
    pub fn children(&self) -> &[Declaration] {
        match self {
            Self::Class { members, .. } => members,
            Self::Function { locals, .. } | Self::Subroutine { locals, .. } => locals,
            Self::Variable { .. } => &[],
        }
    }

    /// Parameters of a routine; empty for classes and variables.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Function { parameters, .. } | Self::Subroutine { parameters, .. } => parameters,
            Self::Class { .. } | Self::Variable { .. } => &[],
        }
    }

    /// Declared type: the return type of a function or the type of a variable.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Function { return_type, .. } => return_type.as_deref(),
            Self::Variable { type_name, .. } => type_name.as_deref(),
            Self::Class { .. } | Self::Subroutine { .. } => None,
        }
    }
}
