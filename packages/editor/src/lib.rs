//! # Vellum Editor
//!
//! Transactional editing core for attachment-centric documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: markup ↔ Node tree, schema, positions│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transactions + commit pipeline      │
//! │  - validate / apply / invert steps          │
//! │  - reconciliation appended to each commit   │
//! │  - attachment insertion command             │
//! │  - undo batches spanning whole commits      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view adapter (external): renders figures,   │
//! │ feeds detected dimensions back as edits     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: the caption attribute and caption
//!    content are two representations of one value, kept equal by the
//!    reconciliation pass
//! 2. **One sequence point**: every mutation, including asynchronous
//!    dimension write-backs, funnels through [`Editor::dispatch`]
//! 3. **One commit, one undo entry**: corrective steps never grow history
//!    on their own
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vellum_editor::{commands, Editor};
//! use vellum_model::AttachmentDescriptor;
//!
//! let mut editor = Editor::from_markup("draft", "<p></p>")?;
//! let descriptor = AttachmentDescriptor {
//!     file_name: Some("photo.png".into()),
//!     content_type: "image/png".into(),
//!     ..Default::default()
//! };
//! assert!(commands::insert_attachments(&mut editor, &[descriptor]));
//! ```

pub mod commands;
mod editor;
mod errors;
mod reconcile;
mod transaction;
mod undo_stack;
pub mod view;

pub use editor::Editor;
pub use errors::EditorError;
pub use reconcile::{CollapseEmptyGalleries, ReconcilePass, ReconcileRule, SyncCaptionAttributes};
pub use transaction::{Selection, Step, StepError, Transaction};
pub use undo_stack::{StepBatch, UndoStack};
pub use view::{apply_detected_dimensions, CaptionFocus, DimensionProbe, FigureView, ViewAdapter};
