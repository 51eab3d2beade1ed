//! jQuery-style queries over parsed HTML
//!
//! ```text
//! address → HttpClient → Document (Arc) → find(selector) → Selection
//!                                              ↓
//!                                    find / add / each / attr
//! ```
//!
//! Documents are immutable and shared; selections are cheap lists of
//! node references that keep their document alive.

pub mod document;
pub mod error;
pub mod fetch;
pub mod node;
pub mod selection;

pub use document::Document;
pub use error::{QueryError, Result};
pub use fetch::{FetchConfig, HttpClient, HttpResponse, ReqwestClient};
pub use node::NodeRef;
pub use selection::Selection;

pub use dom::{Attribute, DomNode, NodeId, NodeType};
