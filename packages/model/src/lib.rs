//! # Vellum Model
//!
//! Document tree model for attachment-centric rich documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ lexer + parse: markup text → Node tree      │
//! │  - legacy dialect (JSON attribute payload)  │
//! │  - native dialect (<attachment> element)    │
//! │  - canonical persisted form (round-trips)   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ node + schema: typed tree + content models  │
//! │ position: flattened offsets, resolution     │
//! │ visit: document-order traversal             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serialize: Node tree → canonical markup     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The editor crate layers transactions, reconciliation and commands on top
//! of this model. Nothing in here mutates a tree behind the caller's back.

pub mod attachment;
pub mod error;
pub mod ids;
pub mod lexer;
pub mod node;
pub mod parse;
pub mod position;
pub mod schema;
pub mod serialize;
pub mod visit;

pub use attachment::{AttachmentDescriptor, ImageAttrs, RenderMode};
pub use error::{ParseError, ParseResult, SchemaError};
pub use ids::{get_document_id, NodeId, NodeIdGenerator};
pub use lexer::{tokenize, Token};
pub use node::{Node, NodeKind};
pub use parse::{parse, parse_document, parse_inline_markup, Parser};
pub use position::{resolve, PathEntry, ResolvedPos};
pub use schema::{ContentModel, NodeSpec, Schema};
pub use serialize::{
    extract_caption_markup, serialize, serialize_inline, serialize_node, Serializer,
};
pub use visit::{walk_document, walk_node, Visitor};
