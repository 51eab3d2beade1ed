//! Error types for DOM operations
//!
//! Raised for node ids missing from an arena, an arena with no root, selectors
//! that fail to compile, and I/O failures while reading markup.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("No root node set")]
    NoRoot,

    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
