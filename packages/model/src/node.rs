//! # Document Tree
//!
//! One node enum covers every structural element. Block nodes own ordered
//! block children; inline containers own inline content (text runs). Every
//! element node carries a stable [`NodeId`]; text runs are anonymous.

use crate::attachment::{AttachmentDescriptor, ImageAttrs};
use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Gallery,
    Figure,
    Image,
    Figcaption,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Gallery => "gallery",
            NodeKind::Figure => "figure",
            NodeKind::Image => "image",
            NodeKind::Figcaption => "figcaption",
            NodeKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Typed tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Root document node
    Doc { id: NodeId, children: Vec<Node> },

    /// Plain text block
    Paragraph { id: NodeId, content: Vec<Node> },

    /// Grouping container for attachment figures.
    /// Zero children is invalid in any committed state.
    Gallery { id: NodeId, children: Vec<Node> },

    /// One attachment plus its inline caption content.
    /// `attrs.caption` mirrors the serialized caption content.
    Figure {
        id: NodeId,
        attrs: AttachmentDescriptor,
        content: Vec<Node>,
    },

    /// Standalone image leaf
    Image { id: NodeId, attrs: ImageAttrs },

    /// Standalone caption container for non-gallery contexts
    Figcaption { id: NodeId, content: Vec<Node> },

    /// Inline text run
    Text { text: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text { text: text.into() }
    }

    pub fn paragraph(id: NodeId) -> Node {
        Node::Paragraph {
            id,
            content: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Doc { .. } => NodeKind::Doc,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Gallery { .. } => NodeKind::Gallery,
            Node::Figure { .. } => NodeKind::Figure,
            Node::Image { .. } => NodeKind::Image,
            Node::Figcaption { .. } => NodeKind::Figcaption,
            Node::Text { .. } => NodeKind::Text,
        }
    }

    pub fn id(&self) -> Option<&NodeId> {
        match self {
            Node::Doc { id, .. }
            | Node::Paragraph { id, .. }
            | Node::Gallery { id, .. }
            | Node::Figure { id, .. }
            | Node::Image { id, .. }
            | Node::Figcaption { id, .. } => Some(id),
            Node::Text { .. } => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Paragraph
                | NodeKind::Gallery
                | NodeKind::Figure
                | NodeKind::Image
                | NodeKind::Figcaption
        )
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.kind(), NodeKind::Text)
    }

    /// Block children or inline content, if this node has any
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Doc { children, .. } | Node::Gallery { children, .. } => Some(children),
            Node::Paragraph { content, .. }
            | Node::Figure { content, .. }
            | Node::Figcaption { content, .. } => Some(content),
            Node::Image { .. } | Node::Text { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Doc { children, .. } | Node::Gallery { children, .. } => Some(children),
            Node::Paragraph { content, .. }
            | Node::Figure { content, .. }
            | Node::Figcaption { content, .. } => Some(content),
            Node::Image { .. } | Node::Text { .. } => None,
        }
    }

    /// Size in the flattened position space.
    ///
    /// Text counts one per char, a leaf node counts one, a non-leaf node
    /// counts its content plus an opening and a closing boundary token.
    pub fn node_size(&self) -> usize {
        match self {
            Node::Text { text } => text.chars().count(),
            Node::Image { .. } => 1,
            _ => 2 + self.content_size(),
        }
    }

    /// Combined size of this node's children
    pub fn content_size(&self) -> usize {
        self.children()
            .map(|children| children.iter().map(Node::node_size).sum())
            .unwrap_or(0)
    }

    /// Concatenated text of this node's inline content
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        if let Some(children) = self.children() {
            for child in children {
                if let Node::Text { text } = child {
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// Find a node by ID anywhere in this subtree
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if self.id() == Some(id) {
            return Some(self);
        }
        for child in self.children()?.iter() {
            if let Some(found) = child.find(id) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if self.id() == Some(id) {
            return Some(self);
        }
        for child in self.children_mut()?.iter_mut() {
            if let Some(found) = child.find_mut(id) {
                return Some(found);
            }
        }
        None
    }

    /// Find the parent of a node and the child index under it
    pub fn find_parent(&self, id: &NodeId) -> Option<(&Node, usize)> {
        let children = self.children()?;
        if let Some(index) = children.iter().position(|c| c.id() == Some(id)) {
            return Some((self, index));
        }
        for child in children {
            if let Some(found) = child.find_parent(id) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable access to the child list containing `id`, plus the child index
    pub fn find_parent_children_mut(&mut self, id: &NodeId) -> Option<(&mut Vec<Node>, usize)> {
        // Two passes keep the borrow checker happy: locate first, borrow after.
        let here = self
            .children()?
            .iter()
            .position(|c| c.id() == Some(id));
        if let Some(index) = here {
            return Some((self.children_mut()?, index));
        }
        for child in self.children_mut()?.iter_mut() {
            if let Some(found) = child.find_parent_children_mut(id) {
                return Some(found);
            }
        }
        None
    }

    /// Flattened position just before the node with `id`.
    /// Root content starts at position zero.
    pub fn position_of(&self, id: &NodeId) -> Option<usize> {
        fn scan(children: &[Node], id: &NodeId, base: usize) -> Option<usize> {
            let mut offset = base;
            for child in children {
                if child.id() == Some(id) {
                    return Some(offset);
                }
                if let Some(kids) = child.children() {
                    if let Some(pos) = scan(kids, id, offset + 1) {
                        return Some(pos);
                    }
                }
                offset += child.node_size();
            }
            None
        }
        scan(self.children()?, id, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeIdGenerator;

    fn sample_doc() -> (Node, NodeId, NodeId) {
        let mut ids = NodeIdGenerator::new("node-tests");
        let para_id = ids.next_id();
        let fig_id = ids.next_id();
        let gallery_id = ids.next_id();
        let doc = Node::Doc {
            id: ids.next_id(),
            children: vec![
                Node::Paragraph {
                    id: para_id,
                    content: vec![Node::text("hi")],
                },
                Node::Gallery {
                    id: gallery_id.clone(),
                    children: vec![Node::Figure {
                        id: fig_id.clone(),
                        attrs: Default::default(),
                        content: vec![Node::text("cap")],
                    }],
                },
            ],
        };
        (doc, gallery_id, fig_id)
    }

    #[test]
    fn test_node_sizes() {
        let (doc, _, _) = sample_doc();
        // paragraph: 2 + "hi" = 4; figure: 2 + "cap" = 5; gallery: 2 + 5 = 7
        assert_eq!(doc.content_size(), 4 + 7);
        assert_eq!(Node::text("abc").node_size(), 3);
    }

    #[test]
    fn test_block_inline_classification() {
        let (doc, _, fig_id) = sample_doc();
        assert!(!doc.is_block());
        assert!(doc.find(&fig_id).unwrap().is_block());
        assert!(Node::text("x").is_inline());
        assert!(!Node::text("x").is_block());
    }

    #[test]
    fn test_find_and_parent() {
        let (doc, gallery_id, fig_id) = sample_doc();

        let figure = doc.find(&fig_id).unwrap();
        assert_eq!(figure.kind(), NodeKind::Figure);

        let (parent, index) = doc.find_parent(&fig_id).unwrap();
        assert_eq!(parent.id(), Some(&gallery_id));
        assert_eq!(index, 0);
    }

    #[test]
    fn test_position_of() {
        let (doc, gallery_id, fig_id) = sample_doc();
        // paragraph occupies [0, 4), gallery starts at 4, figure at 5
        assert_eq!(doc.position_of(&gallery_id), Some(4));
        assert_eq!(doc.position_of(&fig_id), Some(5));
    }

    #[test]
    fn test_text_content() {
        let (doc, _, fig_id) = sample_doc();
        assert_eq!(doc.find(&fig_id).unwrap().text_content(), "cap");
    }
}
