//! # Positions
//!
//! Integer offsets into the flattened document. A position is computed per
//! transaction and never stored on a node: text counts one per char, a leaf
//! node counts one, and a non-leaf node counts its content plus an opening
//! and a closing boundary token. The root's content starts at zero.

use crate::ids::NodeId;
use crate::node::{Node, NodeKind};

/// One ancestor along a resolved position's path
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Position where this node's content starts
    pub start: usize,
    /// Position where this node's content ends
    pub end: usize,
    /// Child index within the parent (zero for the root)
    pub index: usize,
}

/// A position resolved against a concrete document state
#[derive(Debug, Clone)]
pub struct ResolvedPos {
    pub pos: usize,
    path: Vec<PathEntry>,
    boundary_index: usize,
}

impl ResolvedPos {
    /// Depth of the deepest ancestor (root is depth zero)
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn entry(&self, depth: usize) -> Option<&PathEntry> {
        self.path.get(depth)
    }

    /// Deepest ancestor containing the position
    pub fn parent(&self) -> &PathEntry {
        // path always holds at least the root
        &self.path[self.path.len() - 1]
    }

    /// Block ancestor directly under the root, if the position sits inside one
    pub fn block_context(&self) -> Option<&PathEntry> {
        self.path.get(1)
    }

    /// Child index at the deepest ancestor where resolution stopped:
    /// the number of children lying entirely before the position.
    pub fn boundary_index(&self) -> usize {
        self.boundary_index
    }

    /// Child range `[from, to)` of the root-level block touched by this
    /// position; an empty range when the position sits between blocks.
    pub fn block_range(&self) -> (usize, usize) {
        match self.block_context() {
            Some(entry) => (entry.index, entry.index + 1),
            None => (self.boundary_index, self.boundary_index),
        }
    }
}

/// Resolve a flattened position against the document, clamping it to the
/// document's content range.
pub fn resolve(doc: &Node, pos: usize) -> ResolvedPos {
    let pos = pos.min(doc.content_size());

    let mut path = Vec::new();
    let mut node = doc;
    let mut start = 0usize;
    let mut index_in_parent = 0usize;
    let mut boundary_index = 0usize;

    loop {
        path.push(PathEntry {
            id: node.id().cloned().unwrap_or_else(|| NodeId::new("")),
            kind: node.kind(),
            start,
            end: start + node.content_size(),
            index: index_in_parent,
        });

        let children = match node.children() {
            Some(children) => children,
            None => break,
        };

        let mut offset = start;
        let mut descend = None;
        boundary_index = children.len();

        for (i, child) in children.iter().enumerate() {
            let size = child.node_size();
            if pos <= offset {
                boundary_index = i;
                break;
            }
            if pos < offset + size {
                if child.children().is_some() {
                    descend = Some((offset + 1, child, i));
                } else {
                    // inside a text run or at a leaf
                    boundary_index = i;
                }
                break;
            }
            offset += size;
            boundary_index = i + 1;
        }

        match descend {
            Some((child_start, child, i)) => {
                node = child;
                start = child_start;
                index_in_parent = i;
            }
            None => break,
        }
    }

    ResolvedPos {
        pos,
        path,
        boundary_index,
    }
}
