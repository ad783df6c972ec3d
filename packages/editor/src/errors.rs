//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] vellum_model::ParseError),

    #[error("Step error: {0}")]
    Step(#[from] crate::transaction::StepError),
}
