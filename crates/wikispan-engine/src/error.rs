use thiserror::Error;

/// Errors from editing a document through a view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("index {index} out of range for text of length {len}")]
    OutOfRange { index: isize, len: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("cannot edit a construct that no longer exists in its document")]
    Detached,

    #[error("a lead section has no heading")]
    NoHeading,
}
