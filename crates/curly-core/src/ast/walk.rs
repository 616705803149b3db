// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tree traversal iterators.

use super::{NodeId, SyntaxTree};

/// Pre-order (parent before children) traversal of a subtree.
#[derive(Debug)]
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'a> Preorder<'a> {
    pub(super) fn new(tree: &'a SyntaxTree, start: NodeId) -> Self {
        let stack = if tree.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { tree, stack }
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.child_nodes(id).collect::<Vec<_>>().into_iter().rev());
        Some(id)
    }
}

/// Post-order (children before parent) traversal of a subtree.
///
/// Resolution runs in this order so that a parent sees its children's
/// results.
#[derive(Debug)]
pub struct Postorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> Postorder<'a> {
    pub(super) fn new(tree: &'a SyntaxTree, start: NodeId) -> Self {
        let stack = if tree.contains(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self { tree, stack }
    }
}

impl Iterator for Postorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            let children: Vec<_> = self.tree.child_nodes(id).collect();
            self.stack
                .extend(children.into_iter().rev().map(|child| (child, false)));
        }
    }
}

/// Walks parent links upward, starting with the node's parent.
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(super) fn new(tree: &'a SyntaxTree, start: NodeId) -> Self {
        Self {
            tree,
            next: tree.parent(start),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}
