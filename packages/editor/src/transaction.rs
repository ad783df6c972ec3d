//! # Transaction Steps
//!
//! High-level semantic operations on the document tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each step represents a semantic operation
//! 2. **Validated**: All steps validate structural constraints before applying
//! 3. **Invertible**: Every step can produce its inverse against the tree it
//!    is about to change, so a batch can be rolled back or undone
//! 4. **Minimal**: No redundant or overly generic operations
//!
//! A [`Transaction`] is an ordered list of steps plus the selection that
//! should hold once the steps have been applied. The editor applies a
//! transaction atomically: a step that fails validation mid-flight unwinds
//! everything applied so far.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vellum_model::{AttachmentDescriptor, Node, NodeId, NodeKind, Schema};

/// Semantic steps over the document tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Step {
    /// Replace the child range `[from_index, to_index)` of a parent with new
    /// nodes; covers insertion (empty range) and deletion (empty nodes)
    ReplaceChildren {
        parent: NodeId,
        from_index: usize,
        to_index: usize,
        nodes: Vec<Node>,
    },

    /// Swap one node for another in place
    ReplaceNode { node: NodeId, with: Node },

    /// Rewrite a figure's whole attribute record
    SetAttachment {
        node: NodeId,
        attrs: AttachmentDescriptor,
    },

    /// Replace a char range of a node's inline text content
    ReplaceText {
        parent: NodeId,
        from: usize,
        to: usize,
        text: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Index range {from}..{to} out of bounds (len {len})")]
    IndexOutOfBounds { from: usize, to: usize, len: usize },

    #[error("Node {0} cannot carry inline text")]
    NotInlineParent(NodeId),

    #[error("Node {0} is not a figure")]
    NotAFigure(NodeId),

    #[error("Replacement node has no identity")]
    AnonymousReplacement,

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}

impl Step {
    /// Validate against the current tree without applying
    pub fn validate(&self, doc: &Node, schema: &Schema) -> Result<(), StepError> {
        match self {
            Step::ReplaceChildren {
                parent,
                from_index,
                to_index,
                nodes,
            } => {
                let parent_node = doc
                    .find(parent)
                    .ok_or_else(|| StepError::ParentNotFound(parent.clone()))?;
                let children = parent_node
                    .children()
                    .ok_or_else(|| StepError::NotInlineParent(parent.clone()))?;
                if from_index > to_index || *to_index > children.len() {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from_index,
                        to: *to_index,
                        len: children.len(),
                    });
                }
                for node in nodes {
                    let mut candidate = parent_node.clone();
                    if let Some(children) = candidate.children_mut() {
                        children.clear();
                        children.push(node.clone());
                    }
                    schema
                        .validate(&candidate)
                        .map_err(|e| StepError::InvalidContent(e.to_string()))?;
                }
                Ok(())
            }

            Step::ReplaceNode { node, with } => {
                if with.id().is_none() {
                    return Err(StepError::AnonymousReplacement);
                }
                doc.find_parent(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?;
                schema
                    .validate(with)
                    .map_err(|e| StepError::InvalidContent(e.to_string()))?;
                Ok(())
            }

            Step::SetAttachment { node, .. } => {
                let target = doc
                    .find(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?;
                if target.kind() != NodeKind::Figure {
                    return Err(StepError::NotAFigure(node.clone()));
                }
                Ok(())
            }

            Step::ReplaceText {
                parent, from, to, ..
            } => {
                let target = doc
                    .find(parent)
                    .ok_or_else(|| StepError::NodeNotFound(parent.clone()))?;
                if !matches!(
                    target.kind(),
                    NodeKind::Paragraph | NodeKind::Figure | NodeKind::Figcaption
                ) {
                    return Err(StepError::NotInlineParent(parent.clone()));
                }
                let len = target.text_content().chars().count();
                if from > to || *to > len {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from,
                        to: *to,
                        len,
                    });
                }
                Ok(())
            }
        }
    }

    /// Apply to the tree. Callers validate first; apply re-checks only what
    /// it needs to stay memory-safe.
    pub fn apply(&self, doc: &mut Node) -> Result<(), StepError> {
        match self {
            Step::ReplaceChildren {
                parent,
                from_index,
                to_index,
                nodes,
            } => {
                let parent_node = doc
                    .find_mut(parent)
                    .ok_or_else(|| StepError::ParentNotFound(parent.clone()))?;
                let children = parent_node
                    .children_mut()
                    .ok_or_else(|| StepError::NotInlineParent(parent.clone()))?;
                if from_index > to_index || *to_index > children.len() {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from_index,
                        to: *to_index,
                        len: children.len(),
                    });
                }
                children.splice(from_index..to_index, nodes.iter().cloned());
                Ok(())
            }

            Step::ReplaceNode { node, with } => {
                let (children, index) = doc
                    .find_parent_children_mut(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?;
                children[index] = with.clone();
                Ok(())
            }

            Step::SetAttachment { node, attrs } => {
                match doc
                    .find_mut(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?
                {
                    Node::Figure {
                        attrs: existing, ..
                    } => {
                        *existing = attrs.clone();
                        Ok(())
                    }
                    _ => Err(StepError::NotAFigure(node.clone())),
                }
            }

            Step::ReplaceText {
                parent,
                from,
                to,
                text,
            } => {
                let target = doc
                    .find_mut(parent)
                    .ok_or_else(|| StepError::NodeNotFound(parent.clone()))?;
                let existing: Vec<char> = target.text_content().chars().collect();
                if from > to || *to > existing.len() {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from,
                        to: *to,
                        len: existing.len(),
                    });
                }
                let mut updated: String = existing[..*from].iter().collect();
                updated.push_str(text);
                updated.extend(&existing[*to..]);
                let content = target
                    .children_mut()
                    .ok_or_else(|| StepError::NotInlineParent(parent.clone()))?;
                content.clear();
                if !updated.is_empty() {
                    content.push(Node::text(updated));
                }
                Ok(())
            }
        }
    }

    /// Build the inverse step against the tree this step is about to change
    pub fn invert(&self, doc: &Node) -> Result<Step, StepError> {
        match self {
            Step::ReplaceChildren {
                parent,
                from_index,
                to_index,
                nodes,
            } => {
                let parent_node = doc
                    .find(parent)
                    .ok_or_else(|| StepError::ParentNotFound(parent.clone()))?;
                let children = parent_node
                    .children()
                    .ok_or_else(|| StepError::NotInlineParent(parent.clone()))?;
                if from_index > to_index || *to_index > children.len() {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from_index,
                        to: *to_index,
                        len: children.len(),
                    });
                }
                Ok(Step::ReplaceChildren {
                    parent: parent.clone(),
                    from_index: *from_index,
                    to_index: from_index + nodes.len(),
                    nodes: children[*from_index..*to_index].to_vec(),
                })
            }

            Step::ReplaceNode { node, with } => {
                let original = doc
                    .find(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?;
                let with_id = with.id().ok_or(StepError::AnonymousReplacement)?;
                Ok(Step::ReplaceNode {
                    node: with_id.clone(),
                    with: original.clone(),
                })
            }

            Step::SetAttachment { node, .. } => {
                match doc
                    .find(node)
                    .ok_or_else(|| StepError::NodeNotFound(node.clone()))?
                {
                    Node::Figure { attrs, .. } => Ok(Step::SetAttachment {
                        node: node.clone(),
                        attrs: attrs.clone(),
                    }),
                    _ => Err(StepError::NotAFigure(node.clone())),
                }
            }

            Step::ReplaceText {
                parent,
                from,
                to,
                text,
            } => {
                let target = doc
                    .find(parent)
                    .ok_or_else(|| StepError::NodeNotFound(parent.clone()))?;
                let existing: Vec<char> = target.text_content().chars().collect();
                if from > to || *to > existing.len() {
                    return Err(StepError::IndexOutOfBounds {
                        from: *from,
                        to: *to,
                        len: existing.len(),
                    });
                }
                Ok(Step::ReplaceText {
                    parent: parent.clone(),
                    from: *from,
                    to: from + text.chars().count(),
                    text: existing[*from..*to].iter().collect(),
                })
            }
        }
    }
}

/// Cursor or range over flattened positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_cursor(&self) -> bool {
        self.anchor == self.head
    }

    pub fn from_pos(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to_pos(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn clamped(&self, max: usize) -> Self {
        Self {
            anchor: self.anchor.min(max),
            head: self.head.min(max),
        }
    }
}

/// Ordered steps plus the resulting selection, applied as one commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub selection: Option<Selection>,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            selection: None,
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
