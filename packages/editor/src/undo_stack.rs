//! # Undo/Redo Stack
//!
//! Tracks committed step batches and replays them. A batch holds a commit's
//! user steps together with the reconciliation corrections appended to it,
//! so undoing a commit undoes both as one unit. Inverses are recorded in
//! reverse application order and replayed front to back.

use crate::transaction::{Step, StepError};
use vellum_model::Node;

/// Steps that are undone/redone together
#[derive(Debug, Clone)]
pub struct StepBatch {
    /// Steps in application order
    pub steps: Vec<Step>,

    /// Inverse steps in reverse application order
    pub inverses: Vec<Step>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl StepBatch {
    pub fn new(steps: Vec<Step>, inverses: Vec<Step>) -> Self {
        Self {
            steps,
            inverses,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied batches, most recent last
    undo_stack: Vec<StepBatch>,

    /// Undone batches, most recent last
    redo_stack: Vec<StepBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Stack with the default depth (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a committed batch; a new commit invalidates the redo future
    pub fn push(&mut self, batch: StepBatch) {
        if batch.steps.is_empty() {
            return;
        }
        self.undo_stack.push(batch);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the most recent batch; returns false when there is none
    pub fn undo(&mut self, doc: &mut Node) -> Result<bool, StepError> {
        let batch = match self.undo_stack.pop() {
            Some(batch) => batch,
            None => return Ok(false),
        };
        for inverse in &batch.inverses {
            inverse.apply(doc)?;
        }
        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, doc: &mut Node) -> Result<bool, StepError> {
        let batch = match self.redo_stack.pop() {
            Some(batch) => batch,
            None => return Ok(false),
        };
        for step in &batch.steps {
            step.apply(doc)?;
        }
        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
