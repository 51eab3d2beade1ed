//! Read-only HTML node tree
//!
//! Parsed documents live in an index-based arena; everything else in this
//! crate reads from it.
//!
//! ## Core Design
//!
//! ```text
//! bytes → HtmlParser (html5ever) → DomArena (owned) → SelectorEngine → Vec<NodeId>
//!                                      ↓
//!                               NodeId (u32) = identity
//! ```

pub mod arena;
pub mod error;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use parser::{HtmlParser, ParserConfig};
pub use selector::{CssSelectorEngine, Matcher, SelectorEngine};
pub use serializer::DomSerializer;
pub use types::*;
