// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source layout of parsed nodes.
//!
//! A [`Layout`] is the exact token sequence a node was parsed from, with
//! the positions of its children interleaved. Rendering a layout in order,
//! tokens with their trivia and children recursively, reproduces the input.

use crate::source_analysis::Token;

/// One element of a node's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// A token owned by this node, with its trivia.
    Token(Token),
    /// The child stored in the given child slot.
    Child(usize),
}

/// The ordered pieces of a parsed node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    pieces: Vec<Piece>,
}

impl Layout {
    /// Creates a layout from pieces.
    #[must_use]
    pub fn new(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    /// The pieces in source order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Mutable access to the pieces.
    pub fn pieces_mut(&mut self) -> &mut Vec<Piece> {
        &mut self.pieces
    }

    /// Consumes the layout.
    #[must_use]
    pub fn into_pieces(self) -> Vec<Piece> {
        self.pieces
    }

    /// Returns `true` if the layout has no pieces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The tokens owned directly by this node.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Token(t) => Some(t),
            Piece::Child(_) => None,
        })
    }

    /// Finds the first owned token with the given text.
    #[must_use]
    pub fn token(&self, text: &str) -> Option<&Token> {
        self.tokens().find(|t| t.text() == text)
    }

    /// Returns `true` if the slot appears in the layout.
    #[must_use]
    pub fn has_child(&self, slot: usize) -> bool {
        self.pieces
            .iter()
            .any(|p| matches!(p, Piece::Child(s) if *s == slot))
    }

    /// Index of the piece holding `slot`.
    #[must_use]
    pub fn child_position(&self, slot: usize) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| matches!(p, Piece::Child(s) if *s == slot))
    }

    /// Removes the piece for `slot`, shifting later slot numbers down by one
    /// when `renumber` is set (used when a variadic child is deleted).
    pub fn remove_child(&mut self, slot: usize, renumber: bool) {
        self.pieces
            .retain(|p| !matches!(p, Piece::Child(s) if *s == slot));
        if renumber {
            for piece in &mut self.pieces {
                if let Piece::Child(s) = piece
                    && *s > slot
                {
                    *s -= 1;
                }
            }
        }
    }

    /// Number of parenthesis pairs wrapping the node's own content: matching
    /// leading `(` and trailing `)` tokens.
    #[must_use]
    pub fn wrapping_parens(&self) -> usize {
        let leading = self
            .pieces
            .iter()
            .take_while(|p| matches!(p, Piece::Token(t) if t.text() == "("))
            .count();
        let trailing = self
            .pieces
            .iter()
            .rev()
            .take_while(|p| matches!(p, Piece::Token(t) if t.text() == ")"))
            .count();
        leading.min(trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::Span;

    fn tok(text: &str) -> Piece {
        Piece::Token(Token::new(
            crate::source_analysis::TokenKind::from_text(text),
            Span::default(),
        ))
    }

    #[test]
    fn finds_tokens_and_children() {
        let layout = Layout::new(vec![Piece::Child(0), tok("+"), Piece::Child(1)]);
        assert!(layout.token("+").is_some());
        assert!(layout.has_child(1));
        assert_eq!(layout.child_position(1), Some(2));
        assert_eq!(layout.tokens().count(), 1);
    }

    #[test]
    fn removing_a_child_renumbers_later_slots() {
        let mut layout = Layout::new(vec![
            tok("("),
            Piece::Child(1),
            tok(","),
            Piece::Child(2),
            tok(")"),
        ]);
        layout.remove_child(1, true);
        assert_eq!(layout.child_position(1), Some(2));
        assert!(!layout.has_child(2));
    }

    #[test]
    fn counts_wrapping_parens() {
        let layout = Layout::new(vec![tok("("), tok("("), Piece::Child(0), tok(")"), tok(")")]);
        assert_eq!(layout.wrapping_parens(), 2);
        let call = Layout::new(vec![Piece::Child(0), tok("("), tok(")")]);
        assert_eq!(call.wrapping_parens(), 0);
    }
}
