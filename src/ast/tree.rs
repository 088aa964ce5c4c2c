//! Arena-backed syntax tree
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! Replacing a subtree rewrites the parent's child slot; the old subtree
//! stays in the arena but is detached, so no node ever has two parents.

use super::node::{NodeKind, Position};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Kind and kind-specific attributes
    pub kind: NodeKind,
    /// Source position
    pub position: Position,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Parent node, `None` for the root and for detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Single-owner syntax tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree whose root has the given kind
    pub fn new(root: NodeKind, position: Position) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.add(root, position);
        tree
    }

    /// Create a tree with an empty `Program` root
    pub fn program() -> Self {
        Self::new(NodeKind::Program, Position::new(1, 1))
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena is empty (never the case for a constructed tree)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node
    pub fn add(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            position,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a node and append it to `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, position: Position) -> NodeId {
        let id = self.add(kind, position);
        self.append_child(parent, id);
        id
    }

    /// Attach a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The `index`-th child, or a malformed-tree error
    pub fn child(&self, id: NodeId, index: usize) -> Result<NodeId> {
        self.children(id).get(index).copied().ok_or_else(|| {
            Error::malformed(
                id.index(),
                format!("{} has no child {}", self.kind(id).label(), index),
            )
        })
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Source position of a node
    pub fn position(&self, id: NodeId) -> Position {
        self.nodes[id.index()].position
    }

    /// Swap `old` for `new` in `old`'s parent. `new` must be detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if self.parent(new).is_some() {
            return Err(Error::malformed(
                new.index(),
                "replacement node is already attached",
            ));
        }
        match self.parent(old) {
            Some(parent) => {
                let slot = self.nodes[parent.index()]
                    .children
                    .iter()
                    .position(|c| *c == old)
                    .ok_or_else(|| Error::malformed(parent.index(), "child link is broken"))?;
                self.nodes[parent.index()].children[slot] = new;
                self.nodes[new.index()].parent = Some(parent);
            }
            None if old == self.root => self.root = new,
            None => return Err(Error::malformed(old.index(), "node is detached")),
        }
        self.nodes[old.index()].parent = None;
        Ok(())
    }

    /// Copy a subtree into fresh, detached nodes
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let node = self.node(id);
        let (kind, position, children) = (node.kind.clone(), node.position, node.children.clone());
        let copy = self.add(kind, position);
        for child in children {
            let child_copy = self.deep_copy(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Pre-order walk of the subtree rooted at `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Closest ancestor (excluding `id`) matching `pred`
    pub fn ancestor(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if pred(self.kind(p)) {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }
}
