//! # Insertion Command
//!
//! Builds the transaction that adds new attachments at the selection.
//! New figures either merge into an adjacent gallery or arrive inside a
//! fresh one fenced by empty paragraphs:
//!
//! - the selection already sits inside a gallery, or a gallery ends just
//!   before it: append the figures at that gallery's content end
//! - otherwise: replace the selection's block range with
//!   `[paragraph, gallery(figures), paragraph]`
//!
//! Either way the resulting selection lands at the end of the last inserted
//! figure's caption, the deepest cursor position at the end of the inserted
//! content. The command fails only when the schema lacks the node types it
//! needs; that is a configuration error, never a runtime condition.

use crate::editor::Editor;
use crate::transaction::{Selection, Step, Transaction};
use vellum_model::{
    parse_inline_markup, resolve, serialize_inline, AttachmentDescriptor, Node, NodeIdGenerator,
    NodeKind, PathEntry, ResolvedPos, Schema,
};

/// Insert attachments at the editor's current selection.
/// Returns false, mutating nothing, when the schema lacks the required
/// node types or no descriptors were given.
pub fn insert_attachments(editor: &mut Editor, descriptors: &[AttachmentDescriptor]) -> bool {
    let tr = match build_insert_transaction(
        &editor.schema,
        &editor.doc,
        editor.selection,
        &mut editor.ids,
        descriptors,
    ) {
        Some(tr) => tr,
        None => return false,
    };
    editor.dispatch(tr).is_ok()
}

/// Build the insertion transaction without dispatching it
pub fn build_insert_transaction(
    schema: &Schema,
    doc: &Node,
    selection: Selection,
    ids: &mut NodeIdGenerator,
    descriptors: &[AttachmentDescriptor],
) -> Option<Transaction> {
    if descriptors.is_empty() {
        return None;
    }
    for kind in [NodeKind::Gallery, NodeKind::Figure, NodeKind::Paragraph] {
        if !schema.contains(kind) {
            tracing::warn!(%kind, "schema lacks node type required for attachment insertion");
            return None;
        }
    }

    let anchor = selection.anchor.min(doc.content_size());
    let current = resolve(doc, anchor);
    // two offsets back crosses the boundary tokens between the selection's
    // block and a gallery that ends immediately before it
    let preceding = resolve(doc, anchor.saturating_sub(2));

    let figures: Vec<Node> = descriptors
        .iter()
        .map(|descriptor| figure_from_descriptor(ids, descriptor))
        .collect();
    let added: usize = figures.iter().map(Node::node_size).sum();

    let target = gallery_context(&current)
        .or_else(|| gallery_context(&preceding))
        .cloned();

    match target {
        Some(gallery) => {
            let count = doc.find(&gallery.id)?.children()?.len();
            tracing::debug!(gallery = %gallery.id, figures = figures.len(), "merging into adjacent gallery");
            // caret: caption end of the last appended figure
            let caret = gallery.end + added - 1;
            Some(
                Transaction::new()
                    .step(Step::ReplaceChildren {
                        parent: gallery.id,
                        from_index: count,
                        to_index: count,
                        nodes: figures,
                    })
                    .with_selection(Selection::cursor(caret)),
            )
        }
        None => {
            let head = resolve(doc, selection.head.min(doc.content_size()));
            let (a_from, a_to) = current.block_range();
            let (h_from, h_to) = head.block_range();
            let from_index = a_from.min(h_from);
            let to_index = a_to.max(h_to).max(from_index);

            let children = doc.children()?;
            let insert_pos: usize = children
                .iter()
                .take(from_index)
                .map(Node::node_size)
                .sum();

            tracing::debug!(figures = figures.len(), "inserting new gallery");
            // leading paragraph (2) then the gallery's opening token; the
            // caret lands at the last figure's caption end
            let caret = insert_pos + 2 + added;
            let nodes = vec![
                Node::paragraph(ids.next_id()),
                Node::Gallery {
                    id: ids.next_id(),
                    children: figures,
                },
                Node::paragraph(ids.next_id()),
            ];

            Some(
                Transaction::new()
                    .step(Step::ReplaceChildren {
                        parent: doc.id()?.clone(),
                        from_index,
                        to_index,
                        nodes,
                    })
                    .with_selection(Selection::cursor(caret)),
            )
        }
    }
}

fn gallery_context(resolved: &ResolvedPos) -> Option<&PathEntry> {
    resolved
        .block_context()
        .filter(|entry| entry.kind == NodeKind::Gallery)
}

/// Build a figure whose caption attribute and inline content agree from
/// birth
fn figure_from_descriptor(ids: &mut NodeIdGenerator, descriptor: &AttachmentDescriptor) -> Node {
    let mut attrs = descriptor.clone();
    let content = parse_inline_markup(&attrs.caption);
    attrs.caption = serialize_inline(&content);
    Node::Figure {
        id: ids.next_id(),
        attrs,
        content,
    }
}
