//! # Reconciliation Pass
//!
//! Edits leave structural invariants to a corrective pass that runs after
//! every commit:
//!
//! - a gallery never persists with zero children; it collapses to one empty
//!   paragraph
//! - a figure's caption attribute always equals the serialized inner markup
//!   of its caption content
//!
//! Rules are deterministic and effect-accumulating: each inspects the tree
//! that resulted from the user's steps and emits corrective steps. The
//! editor appends those to the same commit, so they share one undo entry
//! and never fire as a separate change. A rule that finds nothing emits
//! nothing; the pass is idempotent over its own output. A node in a
//! transiently odd shape (say, a scratch render without a caption
//! sub-element) means "no correction", never an error.

use crate::transaction::Step;
use vellum_model::{
    extract_caption_markup, serialize_node, walk_document, Node, NodeId, NodeIdGenerator, Visitor,
};

/// A corrective rule run once per commit
pub trait ReconcileRule: std::fmt::Debug {
    /// Inspect the committed tree and emit corrective steps
    fn inspect(&self, doc: &Node, ids: &mut NodeIdGenerator) -> Vec<Step>;
}

/// Replace every gallery with zero children by a single empty paragraph
#[derive(Debug)]
pub struct CollapseEmptyGalleries;

#[derive(Default)]
struct EmptyGalleryCollector {
    empty: Vec<NodeId>,
}

impl Visitor for EmptyGalleryCollector {
    fn visit_gallery(&mut self, node: &Node, _pos: usize) {
        if node.children().map(|c| c.is_empty()).unwrap_or(false) {
            if let Some(id) = node.id() {
                self.empty.push(id.clone());
            }
        }
    }
}

impl ReconcileRule for CollapseEmptyGalleries {
    fn inspect(&self, doc: &Node, ids: &mut NodeIdGenerator) -> Vec<Step> {
        let mut collector = EmptyGalleryCollector::default();
        walk_document(&mut collector, doc);

        collector
            .empty
            .into_iter()
            .map(|gallery| Step::ReplaceNode {
                node: gallery,
                with: Node::paragraph(ids.next_id()),
            })
            .collect()
    }
}

/// Keep `attrs.caption` equal to the serialized caption content.
///
/// Each figure is rendered through the canonical persistence serializer
/// into an off-tree scratch string; the caption sub-element's inner markup
/// is extracted and compared against the stored attribute. Only that one
/// attribute is rewritten; everything else is carried over unchanged.
#[derive(Debug)]
pub struct SyncCaptionAttributes;

#[derive(Default)]
struct FigureCollector {
    figures: Vec<Node>,
}

impl Visitor for FigureCollector {
    fn visit_figure(&mut self, node: &Node, _pos: usize) {
        self.figures.push(node.clone());
    }
}

impl ReconcileRule for SyncCaptionAttributes {
    fn inspect(&self, doc: &Node, _ids: &mut NodeIdGenerator) -> Vec<Step> {
        let mut collector = FigureCollector::default();
        walk_document(&mut collector, doc);

        let mut steps = Vec::new();
        for figure in collector.figures {
            let (id, attrs) = match &figure {
                Node::Figure { id, attrs, .. } => (id, attrs),
                _ => continue,
            };
            let scratch = serialize_node(&figure);
            let rendered = match extract_caption_markup(&scratch) {
                Some(markup) => markup,
                // no caption sub-element means no correction
                None => continue,
            };
            if rendered != attrs.caption {
                let mut updated = attrs.clone();
                updated.caption = rendered;
                steps.push(Step::SetAttachment {
                    node: id.clone(),
                    attrs: updated,
                });
            }
        }
        steps
    }
}

/// Engine holding the registered rules
#[derive(Debug)]
pub struct ReconcilePass {
    rules: Vec<Box<dyn ReconcileRule>>,
}

impl ReconcilePass {
    /// Pass with the default rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CollapseEmptyGalleries),
                Box::new(SyncCaptionAttributes),
            ],
        }
    }

    /// Run every rule over the committed tree and accumulate corrections
    pub fn inspect(&self, doc: &Node, ids: &mut NodeIdGenerator) -> Vec<Step> {
        let mut corrections = Vec::new();
        for rule in &self.rules {
            corrections.append(&mut rule.inspect(doc, ids));
        }
        if !corrections.is_empty() {
            tracing::debug!(corrections = corrections.len(), "reconciliation corrections");
        }
        corrections
    }
}

impl Default for ReconcilePass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::AttachmentDescriptor;

    fn ids() -> NodeIdGenerator {
        NodeIdGenerator::new("reconcile-tests")
    }

    #[test]
    fn test_empty_gallery_collapses_to_paragraph() {
        let mut gen = ids();
        let gallery_id = gen.next_id();
        let doc = Node::Doc {
            id: gen.next_id(),
            children: vec![Node::Gallery {
                id: gallery_id.clone(),
                children: vec![],
            }],
        };

        let steps = ReconcilePass::new().inspect(&doc, &mut gen);
        assert_eq!(steps.len(), 1);
        match &steps[0] {
            Step::ReplaceNode { node, with } => {
                assert_eq!(*node, gallery_id);
                assert_eq!(with.kind(), vellum_model::NodeKind::Paragraph);
                assert_eq!(with.content_size(), 0);
            }
            other => panic!("expected ReplaceNode, got {:?}", other),
        }
    }

    #[test]
    fn test_caption_attribute_resynced() {
        let mut gen = ids();
        let figure_id = gen.next_id();
        let doc = Node::Doc {
            id: gen.next_id(),
            children: vec![Node::Figure {
                id: figure_id.clone(),
                attrs: AttachmentDescriptor {
                    caption: "stale".to_string(),
                    ..Default::default()
                },
                content: vec![Node::text("fresh & new")],
            }],
        };

        let steps = ReconcilePass::new().inspect(&doc, &mut gen);
        assert_eq!(steps.len(), 1);
        match &steps[0] {
            Step::SetAttachment { node, attrs } => {
                assert_eq!(*node, figure_id);
                assert_eq!(attrs.caption, "fresh &amp; new");
            }
            other => panic!("expected SetAttachment, got {:?}", other),
        }
    }

    #[test]
    fn test_consistent_tree_emits_nothing() {
        let mut gen = ids();
        let doc = Node::Doc {
            id: gen.next_id(),
            children: vec![Node::Gallery {
                id: gen.next_id(),
                children: vec![Node::Figure {
                    id: gen.next_id(),
                    attrs: AttachmentDescriptor {
                        caption: "steady".to_string(),
                        ..Default::default()
                    },
                    content: vec![Node::text("steady")],
                }],
            }],
        };

        assert!(ReconcilePass::new().inspect(&doc, &mut gen).is_empty());
    }

    #[test]
    fn test_idempotent_over_own_output() {
        let mut gen = ids();
        let doc_id = gen.next_id();
        let mut doc = Node::Doc {
            id: doc_id,
            children: vec![
                Node::Gallery {
                    id: gen.next_id(),
                    children: vec![],
                },
                Node::Figure {
                    id: gen.next_id(),
                    attrs: Default::default(),
                    content: vec![Node::text("late caption")],
                },
            ],
        };

        let pass = ReconcilePass::new();
        let steps = pass.inspect(&doc, &mut gen);
        assert!(!steps.is_empty());
        for step in &steps {
            step.apply(&mut doc).unwrap();
        }

        assert!(pass.inspect(&doc, &mut gen).is_empty());
    }

    #[test]
    fn test_attributes_other_than_caption_preserved() {
        let mut gen = ids();
        let attrs = AttachmentDescriptor {
            caption: "old".to_string(),
            content_type: "image/png".to_string(),
            file_name: Some("p.png".to_string()),
            sgid: Some("keep-me".to_string()),
            ..Default::default()
        };
        let doc = Node::Doc {
            id: gen.next_id(),
            children: vec![Node::Figure {
                id: gen.next_id(),
                attrs,
                content: vec![Node::text("new")],
            }],
        };

        let steps = ReconcilePass::new().inspect(&doc, &mut gen);
        match &steps[0] {
            Step::SetAttachment { attrs, .. } => {
                assert_eq!(attrs.caption, "new");
                assert_eq!(attrs.content_type, "image/png");
                assert_eq!(attrs.sgid.as_deref(), Some("keep-me"));
            }
            other => panic!("expected SetAttachment, got {:?}", other),
        }
    }
}
