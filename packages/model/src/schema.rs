//! # Schema
//!
//! Runtime registry of node types and their content models. The schema is
//! the configuration surface of the editing core: commands that need node
//! types the schema does not register fail cleanly instead of mutating.

use crate::error::SchemaError;
use crate::node::{Node, NodeKind};
use std::collections::HashMap;

/// What a node type may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Zero or more block nodes
    Blocks,
    /// Zero or more inline nodes
    Inline,
    /// No children (leaf)
    Empty,
}

/// Declaration of one node type
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub content: ContentModel,
    /// Placement group ("root", "block", "inline"); content models admit
    /// children by group
    pub group: &'static str,
}

/// Node type registry
#[derive(Debug, Clone)]
pub struct Schema {
    specs: HashMap<NodeKind, NodeSpec>,
}

impl Schema {
    /// Empty schema; register node types explicitly
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    pub fn register(&mut self, spec: NodeSpec) {
        self.specs.insert(spec.kind, spec);
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.specs.contains_key(&kind)
    }

    pub fn spec(&self, kind: NodeKind) -> Option<&NodeSpec> {
        self.specs.get(&kind)
    }

    /// Check a subtree against the registered content models
    pub fn validate(&self, node: &Node) -> Result<(), SchemaError> {
        let kind = node.kind();
        let spec = self
            .spec(kind)
            .ok_or(SchemaError::UnknownKind(kind))?;

        match spec.content {
            ContentModel::Empty => {
                if node.children().map(|c| !c.is_empty()).unwrap_or(false) {
                    return Err(SchemaError::UnexpectedChildren(kind));
                }
            }
            ContentModel::Blocks => self.check_children(node, kind, "block")?,
            ContentModel::Inline => self.check_children(node, kind, "inline")?,
        }

        for child in node.children().into_iter().flatten() {
            self.validate(child)?;
        }

        Ok(())
    }

    /// Every child must be registered and belong to the admitted group
    fn check_children(&self, node: &Node, parent: NodeKind, group: &str) -> Result<(), SchemaError> {
        for child in node.children().into_iter().flatten() {
            let child_kind = child.kind();
            let child_spec = self
                .spec(child_kind)
                .ok_or(SchemaError::UnknownKind(child_kind))?;
            if child_spec.group != group {
                return Err(SchemaError::InvalidChild {
                    parent,
                    child: child_kind,
                });
            }
        }
        Ok(())
    }
}

impl Default for Schema {
    /// Schema with all seven node types registered
    fn default() -> Self {
        let mut schema = Schema::empty();
        schema.register(NodeSpec {
            kind: NodeKind::Doc,
            content: ContentModel::Blocks,
            group: "root",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Paragraph,
            content: ContentModel::Inline,
            group: "block",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Gallery,
            content: ContentModel::Blocks,
            group: "block",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Figure,
            content: ContentModel::Inline,
            group: "block",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Image,
            content: ContentModel::Empty,
            group: "block",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Figcaption,
            content: ContentModel::Inline,
            group: "block",
        });
        schema.register(NodeSpec {
            kind: NodeKind::Text,
            content: ContentModel::Empty,
            group: "inline",
        });
        schema
    }
}
