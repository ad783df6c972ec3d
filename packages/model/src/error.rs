use crate::node::NodeKind;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid markup at {pos}: {message}")]
    InvalidMarkup { pos: usize, message: String },
}

impl ParseError {
    pub fn unexpected_token(
        pos: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_markup(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidMarkup {
            pos,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Node kind {0} is not registered in the schema")]
    UnknownKind(NodeKind),

    #[error("Node kind {child} is not valid content for {parent}")]
    InvalidChild { parent: NodeKind, child: NodeKind },

    #[error("Node kind {0} does not allow children")]
    UnexpectedChildren(NodeKind),
}
