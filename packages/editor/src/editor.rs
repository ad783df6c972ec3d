//! # Editor Handle
//!
//! Owns the document tree, its schema, the selection, and the undo history.
//! `dispatch` is the single sequence point every mutation funnels through:
//! user steps apply first, then the reconciliation pass inspects the result
//! and its corrective steps are appended to the same commit. One commit is
//! one undo entry and one version bump; a transaction whose steps and
//! corrections both come up empty commits nothing at all.

use crate::errors::EditorError;
use crate::reconcile::ReconcilePass;
use crate::transaction::{Selection, Step, StepError, Transaction};
use crate::undo_stack::{StepBatch, UndoStack};
use vellum_model::{parse_document, Node, NodeIdGenerator, Schema};

/// Editable document
#[derive(Debug)]
pub struct Editor {
    pub(crate) schema: Schema,
    pub(crate) doc: Node,
    pub(crate) selection: Selection,
    pub(crate) version: u64,
    pub(crate) undo: UndoStack,
    pub(crate) reconcile: ReconcilePass,
    pub(crate) ids: NodeIdGenerator,
}

impl Editor {
    /// Editor over an existing tree with the default schema
    pub fn new(doc: Node, ids: NodeIdGenerator) -> Self {
        Self::with_schema(Schema::default(), doc, ids)
    }

    pub fn with_schema(schema: Schema, doc: Node, ids: NodeIdGenerator) -> Self {
        let mut editor = Self {
            schema,
            doc,
            selection: Selection::cursor(0),
            version: 0,
            undo: UndoStack::new(),
            reconcile: ReconcilePass::new(),
            ids,
        };
        editor.normalize_initial_state();
        editor
    }

    /// Parse markup into a fresh editor
    pub fn from_markup(name: &str, markup: &str) -> Result<Self, EditorError> {
        let mut ids = NodeIdGenerator::new(name);
        let doc = parse_document(markup, &mut ids)?;
        Ok(Self::new(doc, ids))
    }

    /// Imported trees may violate the committed-state invariants (stale
    /// captions, empty galleries); fix them up before the first edit, with
    /// no undo entry and no version bump.
    fn normalize_initial_state(&mut self) {
        if self
            .doc
            .children()
            .map(|c| c.is_empty())
            .unwrap_or(false)
        {
            let id = self.ids.next_id();
            if let Some(children) = self.doc.children_mut() {
                children.push(Node::paragraph(id));
            }
        }
        let corrections = self.reconcile.inspect(&self.doc, &mut self.ids);
        for step in corrections {
            if let Err(error) = step.apply(&mut self.doc) {
                tracing::warn!(%error, "initial normalization step failed");
            }
        }
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Committed state: the tree plus its version
    pub fn committed(&self) -> (&Node, u64) {
        (&self.doc, self.version)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Apply a transaction as one commit.
    ///
    /// Steps validate against the evolving tree one at a time; a mid-flight
    /// failure rolls back everything already applied and leaves the
    /// document unchanged. Reconciliation corrections are appended to the
    /// same undo batch.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<(), EditorError> {
        let mut applied: Vec<Step> = Vec::new();
        let mut inverses: Vec<Step> = Vec::new();

        for step in &tr.steps {
            if let Err(error) = self.apply_step(step, &mut applied, &mut inverses) {
                self.rollback(&inverses);
                return Err(error.into());
            }
        }

        let corrections = self.reconcile.inspect(&self.doc, &mut self.ids);
        let correction_count = corrections.len();
        for step in &corrections {
            if let Err(error) = self.apply_step(step, &mut applied, &mut inverses) {
                self.rollback(&inverses);
                return Err(error.into());
            }
        }

        if !applied.is_empty() {
            let user_steps = tr.steps.len();
            self.undo.push(StepBatch::new(applied, inverses));
            self.version += 1;
            tracing::debug!(
                version = self.version,
                user_steps,
                corrections = correction_count,
                "commit"
            );
        }

        let max = self.doc.content_size();
        self.selection = match tr.selection {
            Some(selection) => selection.clamped(max),
            None => self.selection.clamped(max),
        };

        Ok(())
    }

    fn apply_step(
        &mut self,
        step: &Step,
        applied: &mut Vec<Step>,
        inverses: &mut Vec<Step>,
    ) -> Result<(), StepError> {
        step.validate(&self.doc, &self.schema)?;
        let inverse = step.invert(&self.doc)?;
        step.apply(&mut self.doc)?;
        applied.push(step.clone());
        // inverses accumulate in reverse application order
        inverses.insert(0, inverse);
        Ok(())
    }

    fn rollback(&mut self, inverses: &[Step]) {
        for inverse in inverses {
            if let Err(error) = inverse.apply(&mut self.doc) {
                tracing::warn!(%error, "rollback step failed");
            }
        }
    }

    /// Undo the most recent commit. Recorded batches already end in an
    /// invariant-satisfying state, so no reconciliation re-entry happens.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let undone = self.undo.undo(&mut self.doc)?;
        if undone {
            self.version += 1;
            self.selection = self.selection.clamped(self.doc.content_size());
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let redone = self.undo.redo(&mut self.doc)?;
        if redone {
            self.version += 1;
            self.selection = self.selection.clamped(self.doc.content_size());
        }
        Ok(redone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Step;
    use vellum_model::NodeKind;

    #[test]
    fn test_from_markup_seeds_empty_doc_with_paragraph() {
        let editor = Editor::from_markup("test", "").unwrap();
        let children = editor.doc().children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), NodeKind::Paragraph);
    }

    #[test]
    fn test_empty_transaction_commits_nothing() {
        let mut editor = Editor::from_markup("test", "<p>hi</p>").unwrap();
        let version = editor.version();

        editor.dispatch(Transaction::new()).unwrap();

        assert_eq!(editor.version(), version);
        assert_eq!(editor.undo_depth(), 0);
    }

    #[test]
    fn test_failed_step_leaves_document_unchanged() {
        let mut editor = Editor::from_markup("test", "<p>hello</p>").unwrap();
        let before = editor.doc().clone();
        let para_id = editor.doc().children().unwrap()[0].id().unwrap().clone();

        let tr = Transaction::new()
            .step(Step::ReplaceText {
                parent: para_id.clone(),
                from: 0,
                to: 5,
                text: "goodbye".to_string(),
            })
            .step(Step::ReplaceText {
                parent: para_id,
                from: 0,
                to: 999,
                text: String::new(),
            });

        assert!(editor.dispatch(tr).is_err());
        assert_eq!(*editor.doc(), before);
        assert_eq!(editor.undo_depth(), 0);
    }

    #[test]
    fn test_import_collapses_empty_gallery_without_history() {
        let markup = r#"<p>before</p><div class="attachment-gallery"></div>"#;
        let editor = Editor::from_markup("test", markup).unwrap();

        let children = editor.doc().children().unwrap();
        assert_eq!(children[1].kind(), NodeKind::Paragraph);
        assert_eq!(children[1].content_size(), 0);
        assert_eq!(editor.version(), 0);
        assert_eq!(editor.undo_depth(), 0);
    }

    #[test]
    fn test_selection_defaults_and_clamps() {
        let mut editor = Editor::from_markup("test", "<p>hello</p>").unwrap();
        let para_id = editor.doc().children().unwrap()[0].id().unwrap().clone();

        // shrink the text; a stale selection past the end clamps
        editor
            .dispatch(
                Transaction::new().with_selection(Selection::cursor(6)),
            )
            .unwrap();
        editor
            .dispatch(Transaction::new().step(Step::ReplaceText {
                parent: para_id,
                from: 0,
                to: 5,
                text: "x".to_string(),
            }))
            .unwrap();

        assert_eq!(editor.selection(), Selection::cursor(3));
    }
}
