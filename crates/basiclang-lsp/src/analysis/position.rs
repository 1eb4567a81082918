//! Mapping a (line, column) position to the token under it.
//!
//! Positions are 1-based. A token covers `[column, column + len)` on its
//! line: the column just past the last character is already outside it.
//! There is no snapping to a neighbouring token.

use basiclang_syntax::{Declaration, Position, Token};

use crate::snapshot::DocumentSnapshot;

/// The token of any kind covering the position.
pub fn token_at(snapshot: &DocumentSnapshot, line: u32, column: u32) -> Option<&Token> {
    if line == 0 || column == 0 {
        return None;
    }
    let tokens = snapshot.tokens();
    let first_on_line = tokens.partition_point(|t| t.line < line);
    tokens[first_on_line..]
        .iter()
        .take_while(|t| t.line == line)
        .find(|t| t.covers(line, column))
}

/// The identifier under the position, if the covering token is one.
pub fn word_at(snapshot: &DocumentSnapshot, line: u32, column: u32) -> Option<&str> {
    token_at(snapshot, line, column)
        .filter(|t| t.is_identifier())
        .map(|t| t.lexeme.as_str())
}

/// The innermost declaration whose span contains the position.
pub fn enclosing_declaration(
    snapshot: &DocumentSnapshot,
    line: u32,
    column: u32,
) -> Option<&Declaration> {
    let position = Position::new(line, column);
    let mut innermost = None;
    let mut level = snapshot.declarations();
    while let Some(found) = level.iter().find(|d| d.span().contains(position)) {
        innermost = Some(found);
        level = found.children();
    }
    innermost
}
