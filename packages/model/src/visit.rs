//! Document-order traversal with flattened positions.
//!
//! Override the `visit_*` hooks you care about; the walk functions carry the
//! position of every visited node so collectors can record where they found
//! things without re-scanning the tree.

use crate::node::Node;

/// Visitor pattern for traversing the tree immutably
pub trait Visitor: Sized {
    fn visit_doc(&mut self, _node: &Node) {}

    fn visit_paragraph(&mut self, _node: &Node, _pos: usize) {}

    fn visit_gallery(&mut self, _node: &Node, _pos: usize) {}

    fn visit_figure(&mut self, _node: &Node, _pos: usize) {}

    fn visit_image(&mut self, _node: &Node, _pos: usize) {}

    fn visit_figcaption(&mut self, _node: &Node, _pos: usize) {}

    fn visit_text(&mut self, _text: &str, _pos: usize) {}
}

/// Walk a whole document; the root's content starts at position zero
pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Node) {
    visitor.visit_doc(doc);
    if let Some(children) = doc.children() {
        walk_children(visitor, children, 0);
    }
}

/// Walk one node at a known position
pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node, pos: usize) {
    match node {
        Node::Doc { .. } => {
            visitor.visit_doc(node);
            if let Some(children) = node.children() {
                walk_children(visitor, children, pos);
            }
        }
        Node::Paragraph { content, .. } => {
            visitor.visit_paragraph(node, pos);
            walk_children(visitor, content, pos + 1);
        }
        Node::Gallery { children, .. } => {
            visitor.visit_gallery(node, pos);
            walk_children(visitor, children, pos + 1);
        }
        Node::Figure { content, .. } => {
            visitor.visit_figure(node, pos);
            walk_children(visitor, content, pos + 1);
        }
        Node::Image { .. } => visitor.visit_image(node, pos),
        Node::Figcaption { content, .. } => {
            visitor.visit_figcaption(node, pos);
            walk_children(visitor, content, pos + 1);
        }
        Node::Text { text } => visitor.visit_text(text, pos),
    }
}

fn walk_children<V: Visitor>(visitor: &mut V, children: &[Node], start: usize) {
    let mut offset = start;
    for child in children {
        walk_node(visitor, child, offset);
        offset += child.node_size();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeIdGenerator;
    use crate::node::NodeKind;

    #[derive(Default)]
    struct Collector {
        seen: Vec<(NodeKind, usize)>,
    }

    impl Visitor for Collector {
        fn visit_paragraph(&mut self, _node: &Node, pos: usize) {
            self.seen.push((NodeKind::Paragraph, pos));
        }

        fn visit_gallery(&mut self, _node: &Node, pos: usize) {
            self.seen.push((NodeKind::Gallery, pos));
        }

        fn visit_figure(&mut self, _node: &Node, pos: usize) {
            self.seen.push((NodeKind::Figure, pos));
        }

        fn visit_text(&mut self, _text: &str, pos: usize) {
            self.seen.push((NodeKind::Text, pos));
        }
    }

    #[test]
    fn test_walk_positions() {
        let mut ids = NodeIdGenerator::new("visit-tests");
        let doc = Node::Doc {
            id: ids.next_id(),
            children: vec![
                Node::Paragraph {
                    id: ids.next_id(),
                    content: vec![Node::text("hi")],
                },
                Node::Gallery {
                    id: ids.next_id(),
                    children: vec![Node::Figure {
                        id: ids.next_id(),
                        attrs: Default::default(),
                        content: vec![Node::text("cap")],
                    }],
                },
            ],
        };

        let mut collector = Collector::default();
        walk_document(&mut collector, &doc);

        assert_eq!(
            collector.seen,
            vec![
                (NodeKind::Paragraph, 0),
                (NodeKind::Text, 1),
                (NodeKind::Gallery, 4),
                (NodeKind::Figure, 5),
                (NodeKind::Text, 6),
            ]
        );
    }
}
