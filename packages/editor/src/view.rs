//! # View Adapter Contract
//!
//! The renderer sits outside this crate; what it must honor lives here.
//! Given a figure's attributes an adapter picks a container class from
//! (mode, extension), renders a preview only in preview mode, and seeds an
//! editable caption from the caption attribute. The one asynchronous path
//! back into the document is dimension detection, which re-enters as an
//! ordinary transaction and is cancelled by validation, not tokens.

use crate::editor::Editor;
use crate::transaction::{Step, Transaction};
use vellum_model::{AttachmentDescriptor, Node, NodeId, RenderMode};

/// What any renderer of a figure must provide
pub trait ViewAdapter {
    fn attrs(&self) -> &AttachmentDescriptor;

    /// Container style classes, (mode × extension)
    fn container_class(&self) -> String {
        self.attrs().class_names()
    }

    /// Source of the preview sub-element; only preview mode renders one
    fn preview_source(&self) -> Option<&str> {
        match self.attrs().render_mode() {
            RenderMode::Preview => self.attrs().best_url(),
            _ => None,
        }
    }

    /// Initial markup for the editable caption sub-element
    fn caption_seed(&self) -> &str {
        &self.attrs().caption
    }
}

/// Focus tracking for one figure's caption, owned by a single adapter
/// instance with an explicit lifecycle per focus/blur pair.
#[derive(Debug, Default)]
pub struct CaptionFocus {
    editing: bool,
}

impl CaptionFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus gained; true when this begins a new editing session
    pub fn begin(&mut self) -> bool {
        let started = !self.editing;
        self.editing = true;
        started
    }

    /// Focus lost; true when this ends an editing session
    pub fn end(&mut self) -> bool {
        let ended = self.editing;
        self.editing = false;
        ended
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }
}

/// Default adapter over a figure's attributes
#[derive(Debug)]
pub struct FigureView {
    attrs: AttachmentDescriptor,
    pub focus: CaptionFocus,
}

impl FigureView {
    pub fn new(attrs: AttachmentDescriptor) -> Self {
        Self {
            attrs,
            focus: CaptionFocus::new(),
        }
    }
}

impl ViewAdapter for FigureView {
    fn attrs(&self) -> &AttachmentDescriptor {
        &self.attrs
    }
}

/// Result of asynchronous natural-dimension detection for one figure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionProbe {
    pub node: NodeId,
    pub attachment_id: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Write detected dimensions back into the figure, exactly once, through
/// the ordinary transaction channel so the reconciliation pass observes it
/// like any other edit.
///
/// Returns false without mutating when the node has vanished, is no longer
/// the same attachment, or already carries dimensions.
pub fn apply_detected_dimensions(editor: &mut Editor, probe: &DimensionProbe) -> bool {
    let attrs = match editor.doc().find(&probe.node) {
        Some(Node::Figure { attrs, .. }) => attrs,
        _ => {
            tracing::debug!(node = %probe.node, "dimension probe target vanished");
            return false;
        }
    };
    if attrs.attachment_id != probe.attachment_id {
        tracing::debug!(node = %probe.node, "dimension probe target was replaced");
        return false;
    }
    if attrs.width.is_some() || attrs.height.is_some() {
        return false;
    }

    let mut updated = attrs.clone();
    updated.width = Some(probe.width);
    updated.height = Some(probe.height);

    let tr = Transaction::new().step(Step::SetAttachment {
        node: probe.node.clone(),
        attrs: updated,
    });
    editor.dispatch(tr).is_ok()
}
