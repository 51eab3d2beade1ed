//! Error types for document construction
//!
//! Only construction can fail. Selector problems never surface here: a
//! selector that does not compile selects nothing.

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Boxed source error from an HTTP collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The address could not be fetched (bad URL, DNS, connect, TLS, I/O)
    #[error("Transport error fetching {url}: {source}")]
    Transport { url: String, source: BoxError },

    /// The response body could not be turned into a node tree
    #[error("Parse error: {0}")]
    Parse(#[source] DomError),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[source] BoxError),
}

impl QueryError {
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        QueryError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, QueryError::Transport { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, QueryError::Parse(_))
    }
}
