// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Canonical formatting.
//!
//! A node is rendered from its layout when it has one (so explicit
//! parentheses, argument modifiers and other raw tokens survive) and from
//! its kind otherwise. Spacing comes from the role of each token, line
//! structure from the node kind:
//!
//! - Namespaces, types, multi-line properties and blocks put `{` and `}`
//!   on lines of their own and their members one per line, indented.
//! - A block written on one line that holds only simple statements stays
//!   on one line.
//! - Embedded statements that are not blocks go on the next line, indented.
//! - Up to `max_blank_lines` empty lines are kept between members.
//!
//! Comments stay attached to their tokens. A `//` comment that would end up
//! in the middle of a line is moved to the end of that line.

use std::borrow::Cow;

use stacker::maybe_grow;

use super::document::{Document, line_suffix};
use super::{FormatOptions, explicit_parens, needs_parens, usable_layout};
use crate::ast::{Modifiers, NodeClass, NodeId, NodeKind, Piece, SyntaxTree};
use crate::source_analysis::{Token, TokenKind, Trivia, is_keyword};

/// Builds the canonical document for the subtree at `id`. A whole file
/// ends with a newline.
pub(super) fn document<'t>(
    tree: &'t SyntaxTree,
    id: NodeId,
    options: &FormatOptions,
    is_file: bool,
) -> Document<'t> {
    let mut emitter = Emitter::new(tree, *options);
    emitter.node(id);
    if is_file && emitter.prev.is_some() {
        emitter.push(Document::Line);
    }
    emitter.finish()
}

/// How a token is spaced against its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Word,
    Infix,
    /// Second and later tokens of a split operator such as `>>`.
    Join,
    Prefix,
    Postfix,
    Dot,
    /// `(` or `[` of a call, index or parameter list.
    Open,
    /// `(` of a parenthesized expression or statement condition.
    Group,
    Close,
    /// `)` of a cast.
    CastClose,
    RankOpen,
    RankComma,
    AttrOpen,
    AngleOpen,
    AngleClose,
    TypeSuffix,
    Comma,
    Semicolon,
    NamedColon,
    BraceOpen,
    BraceClose,
    Comment,
    /// A token the grammar did not model; spaced as in the source.
    Raw { space: bool },
}

fn spaced(prev: (Role, char), next: Role, text: &str) -> bool {
    use Role::*;

    let (prev, last) = prev;
    if let Raw { space } = next {
        return space;
    }
    // `- -x` must not become `--x`.
    if prev == Prefix && matches!(last, '+' | '-') && text.starts_with(last) {
        return true;
    }
    if matches!(
        next,
        Close
            | CastClose
            | Comma
            | RankComma
            | Semicolon
            | Dot
            | Postfix
            | AngleOpen
            | AngleClose
            | TypeSuffix
            | Join
            | Open
            | RankOpen
            | NamedColon
    ) {
        return false;
    }
    !matches!(
        prev,
        Open | Group | Dot | Prefix | AngleOpen | CastClose | RankOpen | RankComma | AttrOpen
    )
}

/// One element of a node as rendered.
#[derive(Debug, Clone)]
enum Item<'t> {
    Token(&'t Token),
    Text(&'t str),
    Owned(String),
    Child(usize),
}

impl Item<'_> {
    fn text(&self) -> Option<&str> {
        match self {
            Self::Token(token) => Some(token.text()),
            Self::Text(text) => Some(text),
            Self::Owned(text) => Some(text),
            Self::Child(_) => None,
        }
    }

    fn is_operator(&self) -> bool {
        match self {
            Self::Token(token) => matches!(token.kind(), TokenKind::Operator(_)),
            Self::Text(text) => text.chars().next().is_some_and(|c| {
                !(c.is_alphanumeric() || matches!(c, '_' | '@' | '"' | '\'' | '$'))
            }),
            Self::Owned(_) | Self::Child(_) => false,
        }
    }
}

fn role_of(kind: &NodeKind, items: &[Item<'_>], index: usize, wrap: usize) -> Role {
    let item = &items[index];
    let previous = index.checked_sub(1).map(|i| &items[i]);
    match item.text().unwrap_or_default() {
        "(" if index < wrap => Role::Group,
        "(" => match kind {
            NodeKind::If
            | NodeKind::While
            | NodeKind::Do
            | NodeKind::For
            | NodeKind::Foreach { .. }
            | NodeKind::Cast => Role::Group,
            _ => Role::Open,
        },
        ")" if matches!(kind, NodeKind::Cast) && matches!(previous, Some(Item::Child(0))) => {
            Role::CastClose
        }
        ")" | "]" => Role::Close,
        "[" => match kind {
            NodeKind::Name(_) => Role::RankOpen,
            NodeKind::Index | NodeKind::New { .. } => Role::Open,
            k if k.class() == NodeClass::Declaration
                || matches!(k, NodeKind::Parameter { .. }) =>
            {
                Role::AttrOpen
            }
            _ => Role::Open,
        },
        "," if matches!(previous.and_then(Item::text), Some("[" | ",")) => Role::RankComma,
        "," => Role::Comma,
        ";" => Role::Semicolon,
        "{" => Role::BraceOpen,
        "}" => Role::BraceClose,
        "." | "?." | "::" => Role::Dot,
        "<" if !matches!(kind, NodeKind::Binary { .. } | NodeKind::OperatorDecl { .. }) => {
            Role::AngleOpen
        }
        ">" if !matches!(kind, NodeKind::Binary { .. } | NodeKind::OperatorDecl { .. }) => {
            Role::AngleClose
        }
        "?" if matches!(kind, NodeKind::Name(_)) => Role::TypeSuffix,
        ":" if matches!(kind, NodeKind::Call | NodeKind::Index | NodeKind::New { .. }) => {
            Role::NamedColon
        }
        _ if item.is_operator() => match kind {
            NodeKind::Unary { op, .. } if op.is_postfix() => Role::Postfix,
            NodeKind::Unary { .. } => Role::Prefix,
            NodeKind::Binary { .. } | NodeKind::OperatorDecl { .. }
                if previous.is_some_and(Item::is_operator) =>
            {
                Role::Join
            }
            _ => Role::Infix,
        },
        _ => Role::Word,
    }
}

/// Number of parenthesis pairs wrapping all other items.
fn wrapping(items: &[Item<'_>]) -> usize {
    let leading = items
        .iter()
        .take_while(|i| i.text() == Some("("))
        .count();
    let trailing = items
        .iter()
        .rev()
        .take_while(|i| i.text() == Some(")"))
        .count();
    leading.min(trailing)
}

/// Child positions that hold an embedded statement or a member body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Embedded {
    Statement,
    Body,
}

fn embedded(kind: &NodeKind, slot: usize) -> Option<Embedded> {
    match (kind, slot) {
        (NodeKind::If, 1 | 2)
        | (NodeKind::While, 1)
        | (NodeKind::Do, 0)
        | (NodeKind::For, 2)
        | (NodeKind::Foreach { .. }, 2) => Some(Embedded::Statement),
        (NodeKind::Method(_) | NodeKind::OperatorDecl { .. }, 1) | (NodeKind::Accessor { .. }, 0) => {
            Some(Embedded::Body)
        }
        _ => None,
    }
}

/// Children laid out one per line without braces of their own.
fn is_list_member(kind: &NodeKind, slot: usize) -> bool {
    match kind {
        NodeKind::CompilationUnit => true,
        NodeKind::Namespace { file_scoped: true } => slot >= 1,
        _ => false,
    }
}

fn is_simple_statement(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::LocalDecl { .. }
            | NodeKind::ExpressionStatement
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Throw
            | NodeKind::Empty
    )
}

struct Frame<'t> {
    width: isize,
    docs: Vec<Document<'t>>,
}

struct Emitter<'t> {
    tree: &'t SyntaxTree,
    options: FormatOptions,
    frames: Vec<Frame<'t>>,
    /// Role and last character of the last text written.
    prev: Option<(Role, char)>,
    at_line_start: bool,
    /// Line breaks owed before the next text.
    pending_lines: usize,
    /// Whether the next token may keep empty lines from the source.
    allow_blank: bool,
    /// Whether the last source token had whitespace after it.
    space_after: bool,
    marks: Vec<NodeId>,
}

impl<'t> Emitter<'t> {
    fn new(tree: &'t SyntaxTree, options: FormatOptions) -> Self {
        Self {
            tree,
            options,
            frames: vec![Frame {
                width: 0,
                docs: Vec::new(),
            }],
            prev: None,
            at_line_start: true,
            pending_lines: 0,
            allow_blank: false,
            space_after: false,
            marks: Vec::new(),
        }
    }

    fn finish(mut self) -> Document<'t> {
        while self.frames.len() > 1 {
            self.dedent();
        }
        self.frames
            .pop()
            .map_or(Document::Nil, |frame| Document::Vec(frame.docs))
    }

    // --- Document building ---

    fn push(&mut self, doc: Document<'t>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.docs.push(doc);
        }
    }

    fn indent(&mut self) {
        let width = isize::try_from(self.options.indent_width).unwrap_or(4);
        self.frames.push(Frame {
            width,
            docs: Vec::new(),
        });
    }

    fn dedent(&mut self) {
        if self.frames.len() > 1
            && let Some(frame) = self.frames.pop()
        {
            self.push(Document::Nest(frame.width, Box::new(Document::Vec(frame.docs))));
        }
    }

    fn line(&mut self) {
        self.pending_lines = self.pending_lines.max(1);
    }

    /// Keeps empty lines seen in the source, up to the configured maximum.
    fn blank(&mut self, newlines: usize) {
        if newlines >= 2 && self.options.max_blank_lines > 0 {
            let lines = 1 + (newlines - 1).min(self.options.max_blank_lines);
            self.pending_lines = self.pending_lines.max(lines);
        }
    }

    fn flush_lines(&mut self) {
        let lines = std::mem::take(&mut self.pending_lines);
        if lines == 0 || self.prev.is_none() {
            return;
        }
        for _ in 0..lines {
            self.push(Document::Line);
        }
        self.at_line_start = true;
    }

    fn write(&mut self, text: Cow<'t, str>, role: Role, mark: bool) {
        self.allow_blank = false;
        let Some(last) = text.chars().last() else {
            return;
        };
        self.flush_lines();
        if !self.at_line_start && self.prev.is_some_and(|prev| spaced(prev, role, &text)) {
            self.push(Document::Str(" "));
        }
        if mark {
            for id in std::mem::take(&mut self.marks) {
                self.push(Document::Mark(id));
            }
        }
        self.push(match text {
            Cow::Borrowed(text) => Document::Str(text),
            Cow::Owned(text) => Document::String(text),
        });
        self.prev = Some((role, last));
        self.at_line_start = false;
    }

    fn comment(&mut self, trivia: &'t Trivia) {
        self.write(Cow::Borrowed(trivia.as_str()), Role::Comment, false);
    }

    fn suffix(&mut self, text: &'t str) {
        self.push(line_suffix(crate::docvec![" ", text]));
    }

    // --- Tokens and trivia ---

    fn leading(&mut self, token: &'t Token) {
        let allow_blank = std::mem::take(&mut self.allow_blank);
        let mut newlines = 0;
        // The last comment was laid out on a line of its own.
        let mut laid_out = false;
        for trivia in token.leading_trivia() {
            if trivia.is_whitespace() {
                newlines += trivia.newline_count();
                continue;
            }
            let directive = matches!(trivia, Trivia::Directive(_));
            let continues = laid_out && newlines > 0;
            if self.pending_lines > 0 || self.at_line_start || directive || continues {
                if continues || directive {
                    self.line();
                }
                if continues || allow_blank {
                    self.blank(newlines);
                }
                self.comment(trivia);
                if trivia.ends_line() {
                    self.line();
                }
                laid_out = true;
            } else if trivia.ends_line() {
                self.suffix(trivia.as_str());
                laid_out = false;
            } else {
                self.comment(trivia);
                laid_out = false;
            }
            newlines = 0;
        }
        if laid_out && newlines > 0 {
            self.line();
            self.blank(newlines);
        } else if allow_blank {
            self.blank(newlines);
        }
    }

    fn trailing(&mut self, token: &'t Token) {
        for trivia in token.trailing_trivia() {
            if trivia.is_whitespace() {
                continue;
            }
            if trivia.ends_line() {
                self.suffix(trivia.as_str());
            } else {
                self.comment(trivia);
            }
        }
        self.space_after = token.trailing_trivia().iter().any(Trivia::is_whitespace);
    }

    fn token(&mut self, token: &'t Token, role: Role) {
        self.leading(token);
        self.write(Cow::Borrowed(token.text()), role, true);
        self.trailing(token);
    }

    fn emit(&mut self, item: &Item<'t>, role: Role) {
        match item {
            Item::Token(token) => self.token(token, role),
            Item::Text(text) => self.write(Cow::Borrowed(text), role, true),
            Item::Owned(text) => self.write(Cow::Owned(text.clone()), role, true),
            Item::Child(_) => {}
        }
    }

    /// `}` of a braced body: its comments stay inside the body.
    fn close_brace(&mut self, item: &Item<'t>) {
        self.line();
        if let Item::Token(token) = item {
            self.leading(token);
        }
        self.dedent();
        self.line();
        match item {
            Item::Token(token) => {
                self.write(Cow::Borrowed(token.text()), Role::BraceClose, true);
                self.trailing(token);
            }
            other => self.emit(other, Role::BraceClose),
        }
    }

    // --- Nodes ---

    fn node(&mut self, id: NodeId) {
        maybe_grow(32 * 1024, 256 * 1024, || self.node_inner(id));
    }

    fn node_inner(&mut self, id: NodeId) {
        let tree = self.tree;
        self.marks.push(id);
        match usable_layout(tree, id) {
            Some(layout) => {
                let items: Vec<Item<'t>> = layout
                    .pieces()
                    .iter()
                    .map(|piece| match piece {
                        Piece::Token(token) => Item::Token(token),
                        Piece::Child(slot) => Item::Child(*slot),
                    })
                    .collect();
                if matches!(tree.kind(id), NodeKind::Unrecognized | NodeKind::Custom { .. }) {
                    self.raw(id, &items);
                } else {
                    self.items(id, &items);
                }
            }
            None => {
                let items = synthesize(tree, id);
                self.items(id, &items);
            }
        }
    }

    /// Renders a child, adding the parentheses precedence requires.
    fn child(&mut self, child: NodeId) {
        let tree = self.tree;
        let parens = needs_parens(tree, child) && explicit_parens(tree, child) == 0;
        if parens {
            self.write(Cow::Borrowed("("), Role::Group, true);
        }
        self.node(child);
        if parens {
            self.write(Cow::Borrowed(")"), Role::Close, true);
        }
    }

    fn is_inline_block(&self, id: NodeId) -> bool {
        let tree = self.tree;
        let node = &tree[id];
        matches!(node.kind, NodeKind::Block)
            && node.format.single_line
            && usable_layout(tree, id).is_some()
            && tree.child_nodes(id).all(|c| is_simple_statement(tree.kind(c)))
    }

    fn is_multiline_property(&self, id: NodeId) -> bool {
        let tree = self.tree;
        tree.variadic_children(id).any(|accessor| {
            matches!(tree.kind(accessor), NodeKind::Accessor { .. })
                && tree.child(accessor, 0).is_some_and(|body| {
                    matches!(tree.kind(body), NodeKind::Block) && !self.is_inline_block(body)
                })
        })
    }

    /// Whether the node's braces hold members one per line.
    fn is_allman(&self, id: NodeId) -> bool {
        match self.tree.kind(id) {
            NodeKind::Block => !self.is_inline_block(id),
            NodeKind::TypeDecl(_) | NodeKind::Namespace { file_scoped: false } => true,
            NodeKind::Property { .. } => self.is_multiline_property(id),
            _ => false,
        }
    }

    fn first_token_starts_line(&self, id: NodeId, item: &Item<'t>) -> bool {
        match item {
            Item::Token(token) => token.starts_line(),
            Item::Child(slot) => self
                .tree
                .child(id, *slot)
                .and_then(|child| self.tree.first_token(child))
                .is_some_and(Token::starts_line),
            Item::Text(_) | Item::Owned(_) => false,
        }
    }

    fn items(&mut self, id: NodeId, items: &[Item<'t>]) {
        let tree = self.tree;
        let kind = tree.kind(id);
        let allman = self.is_allman(id);
        let declaration = kind.class() == NodeClass::Declaration;
        let wrap = wrapping(items);
        let mut depth = 0usize;
        let mut in_body = false;
        let mut first = !matches!(kind, NodeKind::Namespace { file_scoped: true });
        for (index, item) in items.iter().enumerate() {
            // Attributes keep their own lines.
            if declaration
                && index > 0
                && items[index - 1].text() == Some("]")
                && self.first_token_starts_line(id, item)
            {
                self.line();
            }
            if let Item::Child(slot) = item {
                if let Some(child) = tree.child(id, *slot) {
                    self.place_child(kind, *slot, child, in_body, &mut first);
                }
                continue;
            }
            let role = role_of(kind, items, index, wrap);
            match role {
                Role::Open | Role::Group | Role::RankOpen | Role::AttrOpen => depth += 1,
                Role::Close | Role::CastClose => depth = depth.saturating_sub(1),
                _ => {}
            }
            if allman && depth == 0 && role == Role::BraceOpen && !in_body {
                self.line();
                self.emit(item, role);
                self.indent();
                in_body = true;
                continue;
            }
            if allman && depth == 0 && role == Role::BraceClose && in_body {
                self.close_brace(item);
                in_body = false;
                continue;
            }
            match (kind, item.text()) {
                (NodeKind::If, Some("else")) => self.line(),
                // `} while (c);` after a block body.
                (NodeKind::Do, Some("while"))
                    if !tree
                        .child(id, 0)
                        .is_some_and(|body| matches!(tree.kind(body), NodeKind::Block)) =>
                {
                    self.line();
                }
                _ => {}
            }
            if let Item::Token(token) = item
                && matches!(token.kind(), TokenKind::Eof)
                && token.has_leading_comment()
            {
                self.line();
                self.allow_blank = true;
            }
            self.emit(item, role);
        }
    }

    fn place_child(
        &mut self,
        kind: &NodeKind,
        slot: usize,
        child: NodeId,
        in_body: bool,
        first: &mut bool,
    ) {
        let tree = self.tree;
        if in_body || is_list_member(kind, slot) {
            self.line();
            self.allow_blank = !*first;
            *first = false;
            self.child(child);
            return;
        }
        let child_kind = tree.kind(child);
        match embedded(kind, slot) {
            Some(Embedded::Statement)
                if matches!(kind, NodeKind::If)
                    && slot == 2
                    && matches!(child_kind, NodeKind::If) =>
            {
                self.child(child);
            }
            Some(Embedded::Statement) if !matches!(child_kind, NodeKind::Block) => {
                self.indent();
                self.line();
                self.child(child);
                self.dedent();
            }
            Some(_) => {
                if matches!(child_kind, NodeKind::Block) && !self.is_inline_block(child) {
                    self.line();
                }
                self.child(child);
            }
            None => self.child(child),
        }
    }

    /// Tokens the grammar kept unparsed: source spacing and line breaks,
    /// indented by brace depth.
    fn raw(&mut self, id: NodeId, items: &[Item<'t>]) {
        let tree = self.tree;
        let mut depth = 0usize;
        for (index, item) in items.iter().enumerate() {
            match item {
                Item::Child(slot) => {
                    let Some(child) = tree.child(id, *slot) else {
                        continue;
                    };
                    if index > 0 && self.first_token_starts_line(id, item) {
                        self.line();
                    }
                    self.child(child);
                }
                Item::Token(token) => {
                    if index > 0 && token.starts_line() {
                        self.line();
                        self.allow_blank = true;
                    }
                    let space = self.space_after || !token.leading_trivia().is_empty();
                    self.leading(token);
                    if matches!(token.kind(), TokenKind::RightBrace) && depth > 0 {
                        self.dedent();
                        depth -= 1;
                    }
                    self.write(Cow::Borrowed(token.text()), Role::Raw { space }, true);
                    self.trailing(token);
                    if matches!(token.kind(), TokenKind::LeftBrace) {
                        self.indent();
                        depth += 1;
                    }
                }
                Item::Text(_) | Item::Owned(_) => {}
            }
        }
        for _ in 0..depth {
            self.dedent();
        }
    }
}

// --- Synthesized nodes ---

struct Synth<'t> {
    items: Vec<Item<'t>>,
    children: &'t [Option<NodeId>],
}

impl<'t> Synth<'t> {
    fn text(&mut self, text: &'t str) {
        self.items.push(Item::Text(text));
    }

    fn has(&self, slot: usize) -> bool {
        self.children.get(slot).copied().flatten().is_some()
    }

    fn slot(&mut self, slot: usize) -> bool {
        let present = self.has(slot);
        if present {
            self.items.push(Item::Child(slot));
        }
        present
    }

    /// Present children from `from` on, separated by `separator`.
    fn list(&mut self, from: usize, separator: Option<&'t str>) {
        let mut first = true;
        for slot in from..self.children.len() {
            if !self.has(slot) {
                continue;
            }
            if !first && let Some(separator) = separator {
                self.text(separator);
            }
            self.items.push(Item::Child(slot));
            first = false;
        }
    }

    fn modifiers(&mut self, modifiers: &'t Modifiers) {
        for word in &modifiers.0 {
            self.text(word);
        }
    }

    fn type_params(&mut self, params: &'t [ecow::EcoString]) {
        if params.is_empty() {
            return;
        }
        self.text("<");
        for (index, param) in params.iter().enumerate() {
            if index > 0 {
                self.text(",");
            }
            self.text(param);
        }
        self.text(">");
    }

    fn body_or_semicolon(&mut self, slot: usize) {
        if !self.slot(slot) {
            self.text(";");
        }
    }
}

/// Items for a node without a usable layout.
fn synthesize(tree: &SyntaxTree, id: NodeId) -> Vec<Item<'_>> {
    let node = &tree[id];
    let mut s = Synth {
        items: Vec::new(),
        children: node.children(),
    };
    for _ in 0..node.format.parens {
        s.text("(");
    }
    match &node.kind {
        NodeKind::CompilationUnit
        | NodeKind::Custom { .. }
        | NodeKind::Unrecognized => s.list(0, None),
        NodeKind::Using { alias, is_static } => {
            s.text("using");
            if *is_static {
                s.text("static");
            }
            if let Some(alias) = alias {
                s.text(alias);
                s.text("=");
            }
            s.slot(0);
            s.text(";");
        }
        NodeKind::Namespace { file_scoped } => {
            s.text("namespace");
            s.slot(0);
            if *file_scoped {
                s.text(";");
                s.list(1, None);
            } else {
                s.text("{");
                s.list(1, None);
                s.text("}");
            }
        }
        NodeKind::TypeDecl(decl) => {
            s.modifiers(&decl.modifiers);
            s.text(decl.kind.keyword());
            s.text(&decl.name);
            s.type_params(&decl.type_params);
            let mut first = true;
            for slot in 0..decl.base_count.min(s.children.len()) {
                if s.has(slot) {
                    s.text(if first { ":" } else { "," });
                    s.slot(slot);
                    first = false;
                }
            }
            s.text("{");
            s.list(decl.base_count, None);
            s.text("}");
        }
        NodeKind::Field { modifiers } => {
            s.modifiers(modifiers);
            s.slot(0);
            s.list(1, Some(","));
            s.text(";");
        }
        NodeKind::Method(method) => {
            s.modifiers(&method.modifiers);
            s.slot(0);
            s.text(&method.name);
            s.type_params(&method.type_params);
            s.text("(");
            s.list(2, Some(","));
            s.text(")");
            s.body_or_semicolon(1);
        }
        NodeKind::OperatorDecl {
            symbol_text,
            modifiers,
            ..
        } => {
            s.modifiers(modifiers);
            s.slot(0);
            s.text("operator");
            s.text(symbol_text);
            s.text("(");
            s.list(2, Some(","));
            s.text(")");
            s.body_or_semicolon(1);
        }
        NodeKind::Property {
            name, modifiers, ..
        } => {
            s.modifiers(modifiers);
            s.slot(0);
            s.text(name);
            s.text("{");
            s.list(2, None);
            s.text("}");
            if s.has(1) {
                s.text("=");
                s.slot(1);
                s.text(";");
            }
        }
        NodeKind::Accessor { kind, modifiers } => {
            s.modifiers(modifiers);
            s.text(kind.word());
            s.body_or_semicolon(0);
        }
        NodeKind::Parameter { name, modifier } => {
            if let Some(modifier) = modifier {
                s.text(modifier);
            }
            s.slot(0);
            s.text(name);
            if s.has(1) {
                s.text("=");
                s.slot(1);
            }
        }
        NodeKind::Declarator { name, .. } => {
            s.text(name);
            if s.has(0) {
                s.text("=");
                s.slot(0);
            }
        }
        NodeKind::EnumMember { name, .. } => {
            s.text(name);
            if s.has(0) {
                s.text("=");
                s.slot(0);
            }
            s.text(",");
        }
        NodeKind::ExpressionBody => {
            s.text("=>");
            s.slot(0);
            s.text(";");
        }
        NodeKind::Block => {
            s.text("{");
            s.list(0, None);
            s.text("}");
        }
        NodeKind::LocalDecl { is_const } => {
            if *is_const {
                s.text("const");
            }
            s.slot(0);
            s.list(1, Some(","));
            let for_initializer = tree
                .parent(id)
                .is_some_and(|p| matches!(tree.kind(p), NodeKind::For))
                && tree.slot_of(id) == Some(0);
            if !for_initializer {
                s.text(";");
            }
        }
        NodeKind::ExpressionStatement => {
            s.slot(0);
            s.text(";");
        }
        NodeKind::If => {
            s.text("if");
            s.text("(");
            s.slot(0);
            s.text(")");
            s.slot(1);
            if s.has(2) {
                s.text("else");
                s.slot(2);
            }
        }
        NodeKind::While => {
            s.text("while");
            s.text("(");
            s.slot(0);
            s.text(")");
            s.slot(1);
        }
        NodeKind::Do => {
            s.text("do");
            s.slot(0);
            s.text("while");
            s.text("(");
            s.slot(1);
            s.text(")");
            s.text(";");
        }
        NodeKind::For => {
            s.text("for");
            s.text("(");
            s.slot(0);
            s.text(";");
            s.slot(1);
            s.text(";");
            s.list(3, Some(","));
            s.text(")");
            s.slot(2);
        }
        NodeKind::Foreach { name } => {
            s.text("foreach");
            s.text("(");
            s.slot(0);
            s.text(name);
            s.text("in");
            s.slot(1);
            s.text(")");
            s.slot(2);
        }
        NodeKind::Return | NodeKind::Throw => {
            s.text(if matches!(node.kind, NodeKind::Return) {
                "return"
            } else {
                "throw"
            });
            s.slot(0);
            s.text(";");
        }
        NodeKind::Break => {
            s.text("break");
            s.text(";");
        }
        NodeKind::Continue => {
            s.text("continue");
            s.text(";");
        }
        NodeKind::Empty => s.text(";"),
        NodeKind::Literal { text, .. } => s.text(text),
        NodeKind::Name(name) => {
            if !name.keyword && is_keyword(&name.name) {
                s.items.push(Item::Owned(format!("@{}", name.name)));
            } else {
                s.text(&name.name);
            }
            if s.children.iter().any(Option::is_some) {
                s.text("<");
                s.list(0, Some(","));
                s.text(">");
            }
            if name.nullable {
                s.text("?");
            }
            for _ in 0..name.rank {
                s.text("[");
                s.text("]");
            }
        }
        NodeKind::This => s.text("this"),
        NodeKind::Base => s.text("base"),
        NodeKind::Binary { op, .. } => {
            s.slot(0);
            s.text(op.symbol());
            s.slot(1);
        }
        NodeKind::Unary { op, .. } if op.is_postfix() => {
            s.slot(0);
            s.text(op.symbol());
        }
        NodeKind::Unary { op, .. } => {
            s.text(op.symbol());
            s.slot(0);
        }
        NodeKind::Conditional => {
            s.slot(0);
            s.text("?");
            s.slot(1);
            s.text(":");
            s.slot(2);
        }
        NodeKind::Call => {
            s.slot(0);
            s.text("(");
            s.list(1, Some(","));
            s.text(")");
        }
        NodeKind::Index => {
            s.slot(0);
            s.text("[");
            s.list(1, Some(","));
            s.text("]");
        }
        NodeKind::New { array } => {
            s.text("new");
            if !s.slot(0) && *array {
                s.text("[");
                s.text("]");
            }
            let has_args = (2..s.children.len()).any(|slot| s.has(slot));
            if *array {
                if has_args {
                    s.text("[");
                    s.list(2, Some(","));
                    s.text("]");
                }
            } else if has_args || !s.has(1) {
                s.text("(");
                s.list(2, Some(","));
                s.text(")");
            }
            s.slot(1);
        }
        NodeKind::Initializer => {
            s.text("{");
            s.list(0, Some(","));
            s.text("}");
        }
        NodeKind::Cast => {
            s.text("(");
            s.slot(0);
            s.text(")");
            s.slot(1);
        }
        NodeKind::Typeof => {
            s.text("typeof");
            s.text("(");
            s.slot(0);
            s.text(")");
        }
    }
    for _ in 0..node.format.parens {
        s.text(")");
    }
    s.items
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOperator, NodeKind, SyntaxTree};
    use crate::source_analysis::{parse, parse_expression, parse_statement};
    use crate::unparse::{FormatOptions, RenderMode, render, render_tree};

    fn format(source: &str) -> String {
        render_tree(&parse(source).tree, &RenderMode::Canonical(FormatOptions::default()))
    }

    fn format_expression(source: &str) -> String {
        render_tree(
            &parse_expression(source).tree,
            &RenderMode::Canonical(FormatOptions::default()),
        )
    }

    fn format_statement(source: &str) -> String {
        render_tree(
            &parse_statement(source).tree,
            &RenderMode::Canonical(FormatOptions::default()),
        )
    }

    #[test]
    fn operators_are_spaced() {
        assert_eq!(format_expression("a+b*c"), "a + b * c");
        assert_eq!(format_expression("x=y??z"), "x = y ?? z");
        assert_eq!(format_expression("a . b ( 1 , 2 ) [ 0 ]"), "a.b(1, 2)[0]");
        assert_eq!(format_expression("- -x"), "- -x");
        assert_eq!(format_expression("!done&&i++<n"), "!done && i++ < n");
        assert_eq!(format_expression("a>>2"), "a >> 2");
    }

    #[test]
    fn explicit_parens_are_kept() {
        assert_eq!(format_expression("( a+b )*c"), "(a + b) * c");
        assert_eq!(format_expression("((x))"), "((x))");
    }

    #[test]
    fn types_casts_and_creation() {
        assert_eq!(format_expression("(int)x"), "(int)x");
        assert_eq!(format_expression("new List<int>( )"), "new List<int>()");
        assert_eq!(format_expression("new int[ ] { 1,2 }"), "new int[] { 1, 2 }");
        assert_eq!(format_expression("typeof( string )"), "typeof(string)");
        assert_eq!(format_statement("int?[] values;"), "int?[] values;");
        assert_eq!(
            format_statement("Dictionary<string,List<int>> map=null;"),
            "Dictionary<string, List<int>> map = null;"
        );
    }

    #[test]
    fn allman_braces_for_types_and_members() {
        let source = "namespace Geometry { public class Point { int x; public int X { get { return x; } } void Move(int dx){x+=dx;} } }";
        let expected = "\
namespace Geometry
{
    public class Point
    {
        int x;
        public int X { get { return x; } }
        void Move(int dx) { x += dx; }
    }
}
";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn multiline_blocks_stay_multiline() {
        let source = "class A {\nvoid F() {\nint y = 1;\nif (y > 0) y--; else {\ny = 0;\n}\n}\n}";
        let expected = "\
class A
{
    void F()
    {
        int y = 1;
        if (y > 0)
            y--;
        else
        {
            y = 0;
        }
    }
}
";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn comments_stay_with_their_tokens() {
        let source = "class A\n{\n    // leading\n    int x; // trailing\n\n\n    void F() { return; }\n}\n";
        let expected = "class A\n{\n    // leading\n    int x; // trailing\n\n    void F() { return; }\n}\n";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn line_comment_inside_a_line_moves_to_its_end() {
        assert_eq!(format_statement("f(a, // first\n b);"), "f(a, b); // first");
    }

    #[test]
    fn comment_before_closing_brace_stays_inside() {
        let source = "class A\n{\n    int x;\n    // end\n}\n";
        assert_eq!(format(source), source);
    }

    #[test]
    fn directives_keep_their_lines() {
        let source = "#if DEBUG\nint x;\n#endif\n";
        assert_eq!(format(source), source);
    }

    #[test]
    fn blank_lines_are_capped() {
        let options = FormatOptions {
            indent_width: 2,
            max_blank_lines: 0,
        };
        let result = parse("class A { int x;\n\n\nint y; }");
        let text = render_tree(&result.tree, &RenderMode::Canonical(options));
        assert_eq!(text, "class A\n{\n  int x;\n  int y;\n}\n");
    }

    #[test]
    fn unsupported_statements_keep_source_lines() {
        let source = "class A\n{\n    void F()\n    {\n        switch (x)\n        {\n            case 1: break;\n        }\n    }\n}\n";
        assert_eq!(format(source), source);
    }

    #[test]
    fn synthesized_statements_render_from_their_kind() {
        let mut tree = SyntaxTree::new();
        let block = tree.add_node(NodeKind::Block);
        let statement = tree.add_node(NodeKind::ExpressionStatement);
        let x = tree.name("x");
        let one = tree.literal("1");
        let assign = tree.binary(BinaryOperator::AddAssign, x, one).unwrap();
        tree.set_child(statement, 0, Some(assign)).unwrap();
        tree.push_child(block, statement).unwrap();
        tree.set_root(block).unwrap();
        let text = render(&tree, block, &RenderMode::Canonical(FormatOptions::default()));
        assert_eq!(text, "{\n    x += 1;\n}");
    }

    #[test]
    fn keyword_names_are_escaped() {
        let mut tree = SyntaxTree::new();
        let name = tree.add_node(NodeKind::Name(crate::ast::NameRef::new("class")));
        tree.set_root(name).unwrap();
        assert_eq!(render(&tree, name, &RenderMode::Exact), "@class");
    }
}
