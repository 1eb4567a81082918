//! Declaration scanner.
//!
//! Walks the token stream statement by statement (a statement ends at a line
//! break or a `:` separator) and builds the declaration tree from
//! `Class`/`Function`/`Sub` blocks and `Dim`/`Const`/field statements.
//! Everything else is skipped. Malformed blocks are reported and closed so
//! the rest of the document is still scanned.

use crate::ast::{Access, Declaration, DeclarationKind, Parameter, SymbolHeader};
use crate::error::{ParseError, ParseErrorKind};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Class,
    Function,
    Subroutine,
}

impl BlockKind {
    const fn declaration_kind(self) -> DeclarationKind {
        match self {
            Self::Class => DeclarationKind::Class,
            Self::Function => DeclarationKind::Function,
            Self::Subroutine => DeclarationKind::Subroutine,
        }
    }

    fn from_keyword(token: &Token) -> Option<Self> {
        if token.is_keyword("class") {
            Some(Self::Class)
        } else if token.is_keyword("function") {
            Some(Self::Function)
        } else if token.is_keyword("sub") {
            Some(Self::Subroutine)
        } else {
            None
        }
    }

    /// Classes hold routines and fields; routines hold only locals.
    fn can_contain(self, inner: Self) -> bool {
        self == Self::Class && inner != Self::Class
    }
}

/// A block whose `End` statement has not been seen yet.
struct OpenBlock {
    kind: BlockKind,
    name: String,
    access: Access,
    start: Position,
    name_span: Span,
    parameters: Vec<Parameter>,
    return_type: Option<String>,
    children: Vec<Declaration>,
}

impl OpenBlock {
    fn into_declaration(self, end: Position) -> Declaration {
        let header = SymbolHeader {
            name: self.name,
            access: self.access,
            span: Span::new(self.start, end.max(self.name_span.end)),
            name_span: self.name_span,
        };
        match self.kind {
            BlockKind::Class => Declaration::Class {
                header,
                members: self.children,
            },
            BlockKind::Function => Declaration::Function {
                header,
                parameters: self.parameters,
                return_type: self.return_type,
                locals: self.children,
            },
            BlockKind::Subroutine => Declaration::Subroutine {
                header,
                parameters: self.parameters,
                locals: self.children,
            },
        }
    }
}

/// Scan `tokens` into top-level declarations, appending problems to `errors`.
pub fn scan_declarations(tokens: &[Token], errors: &mut Vec<ParseError>) -> Vec<Declaration> {
    let mut scanner = Scanner {
        stack: Vec::new(),
        declarations: Vec::new(),
        errors,
        last_end: Position::new(1, 1),
    };

    for statement in statements(tokens) {
        scanner.statement(&statement);
        if let Some(last) = statement.last() {
            scanner.last_end = last.span().end;
        }
    }

    scanner.finish()
}

/// Split tokens into statements, dropping comments.
fn statements(tokens: &[Token]) -> Vec<Vec<&Token>> {
    let mut out = Vec::new();
    let mut current: Vec<&Token> = Vec::new();

    for token in tokens.iter().filter(|t| t.kind != TokenKind::Comment) {
        let new_line = current.first().is_some_and(|first| first.line != token.line);
        if new_line {
            out.push(std::mem::take(&mut current));
        }
        if token.is_punct(":") {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(token);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn statement_span(statement: &[&Token]) -> Span {
    match (statement.first(), statement.last()) {
        (Some(first), Some(last)) => Span::new(first.start(), last.span().end),
        _ => Span::on_line(1, 1, 0),
    }
}

/// Type named after an `As` keyword at `tokens[0]`, skipping `New`.
fn as_type(tokens: &[&Token]) -> Option<String> {
    if !tokens.first()?.is_keyword("as") {
        return None;
    }
    let rest = &tokens[1..];
    let rest = if rest.first().is_some_and(|t| t.is_keyword("new")) {
        &rest[1..]
    } else {
        rest
    };
    rest.first()
        .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
        .map(|t| t.lexeme.clone())
}

/// Split on top-level commas (outside parentheses).
fn split_top_level_commas<'a, 't>(tokens: &'a [&'t Token]) -> Vec<&'a [&'t Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
        } else if token.is_punct(",") && depth == 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

struct Scanner<'e> {
    stack: Vec<OpenBlock>,
    declarations: Vec<Declaration>,
    errors: &'e mut Vec<ParseError>,
    /// End of the previous statement; unterminated blocks close here.
    last_end: Position,
}

impl Scanner<'_> {
    fn statement(&mut self, statement: &[&Token]) {
        let (access, rest) = match statement.first() {
            Some(t) if t.is_keyword("public") => (Some(Access::Public), &statement[1..]),
            Some(t) if t.is_keyword("private") => (Some(Access::Private), &statement[1..]),
            _ => (None, statement),
        };
        let Some(head) = rest.first() else {
            if let Some(modifier) = statement.first() {
                self.error(
                    ParseErrorKind::Expected("a declaration after the access modifier".into()),
                    modifier.span(),
                );
            }
            return;
        };

        if let Some(kind) = BlockKind::from_keyword(head) {
            self.open_block(kind, access, statement, rest);
        } else if head.is_keyword("end") {
            self.end_block(statement, rest);
        } else if head.is_keyword("dim") || head.is_keyword("const") {
            self.variables(access, statement, &rest[1..]);
        } else if access.is_some() && head.is_identifier() {
            self.variables(access, statement, rest);
        }
    }

    fn open_block(
        &mut self,
        kind: BlockKind,
        access: Option<Access>,
        statement: &[&Token],
        rest: &[&Token],
    ) {
        while let Some(top) = self.stack.last() {
            if top.kind.can_contain(kind) {
                break;
            }
            self.close_unterminated();
        }

        let keyword = rest[0];
        let Some(name) = rest.get(1).filter(|t| t.is_identifier()) else {
            self.error(
                ParseErrorKind::Expected(format!(
                    "a name after `{}`",
                    kind.declaration_kind().keyword()
                )),
                keyword.span(),
            );
            return;
        };

        let mut block = OpenBlock {
            kind,
            name: name.lexeme.clone(),
            access: access.unwrap_or_default(),
            start: statement[0].start(),
            name_span: name.span(),
            parameters: Vec::new(),
            return_type: None,
            children: Vec::new(),
        };

        if kind != BlockKind::Class {
            let mut after = &rest[2..];
            if after.first().is_some_and(|t| t.is_punct("(")) {
                let close = after.iter().position(|t| t.is_punct(")"));
                let inner = &after[1..close.unwrap_or(after.len())];
                block.parameters = parameters(inner);
                after = close.map_or(&[][..], |i| &after[i + 1..]);
                if close.is_none() {
                    self.error(ParseErrorKind::Expected("`)`".into()), statement_span(statement));
                }
            }
            if kind == BlockKind::Function {
                block.return_type = as_type(after);
            }
        }

        self.stack.push(block);
    }

    fn end_block(&mut self, statement: &[&Token], rest: &[&Token]) {
        // `End If`, `End Select` and a bare `End` are not declaration blocks.
        let Some(kind) = rest.get(1).and_then(|t| BlockKind::from_keyword(t)) else {
            return;
        };
        let span = statement_span(statement);

        let Some(index) = self.stack.iter().rposition(|b| b.kind == kind) else {
            self.error(ParseErrorKind::UnmatchedEnd(kind.declaration_kind()), span);
            return;
        };

        if let Some(top) = self.stack.last() {
            if index + 1 != self.stack.len() {
                let expected = top.kind.declaration_kind();
                self.error(
                    ParseErrorKind::MismatchedEnd {
                        expected,
                        found: kind.declaration_kind(),
                    },
                    span,
                );
                while self.stack.len() > index + 1 {
                    self.close_top(self.last_end);
                }
            }
        }
        self.close_top(span.end);
    }

    fn variables(&mut self, access: Option<Access>, statement: &[&Token], names: &[&Token]) {
        let in_routine = self
            .stack
            .last()
            .is_some_and(|b| b.kind != BlockKind::Class);
        if in_routine && access.is_some() {
            self.error(
                ParseErrorKind::MisplacedDeclaration(DeclarationKind::Variable),
                statement_span(statement),
            );
        }

        let segments = split_top_level_commas(names);
        for (i, segment) in segments.into_iter().enumerate() {
            let Some(name) = segment.first().filter(|t| t.is_identifier()) else {
                self.error(
                    ParseErrorKind::Expected("a variable name".into()),
                    statement_span(statement),
                );
                continue;
            };
            let start = if i == 0 {
                statement[0].start()
            } else {
                name.start()
            };
            let end = segment.last().map_or(name.span().end, |t| t.span().end);
            let declaration = Declaration::Variable {
                header: SymbolHeader {
                    name: name.lexeme.clone(),
                    access: access.unwrap_or_default(),
                    span: Span::new(start, end),
                    name_span: name.span(),
                },
                type_name: as_type(&segment[1..]),
            };
            self.attach(declaration);
        }
    }

    fn attach(&mut self, declaration: Declaration) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(declaration),
            None => self.declarations.push(declaration),
        }
    }

    fn close_top(&mut self, end: Position) {
        if let Some(block) = self.stack.pop() {
            let declaration = block.into_declaration(end);
            self.attach(declaration);
        }
    }

    fn close_unterminated(&mut self) {
        if let Some(top) = self.stack.last() {
            let kind = top.kind.declaration_kind();
            let span = top.name_span;
            self.error(ParseErrorKind::UnterminatedBlock(kind), span);
            self.close_top(self.last_end);
        }
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    fn finish(mut self) -> Vec<Declaration> {
        while !self.stack.is_empty() {
            self.close_unterminated();
        }
        self.declarations
    }
}

/// Parse a parameter list (the tokens between the parentheses).
fn parameters(tokens: &[&Token]) -> Vec<Parameter> {
    split_top_level_commas(tokens)
        .into_iter()
        .filter_map(|segment| {
            let rest: Vec<&Token> = segment
                .iter()
                .copied()
                .skip_while(|t| {
                    t.is_keyword("byval") || t.is_keyword("byref") || t.is_keyword("optional")
                })
                .collect();
            let name = rest.first().filter(|t| t.is_identifier())?;
            let type_name = rest
                .iter()
                .position(|t| t.is_keyword("as"))
                .and_then(|i| as_type(&rest[i..]));
            Some(Parameter {
                name: name.lexeme.clone(),
                type_name,
                span: name.span(),
            })
        })
        .collect()
}
