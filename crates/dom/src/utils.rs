//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};

/// Get all text content from node and its children
///
/// Text descendants are concatenated in document order, whitespace kept.
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if matches!(node.node_type, NodeType::Text | NodeType::CdataSection) {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text)
}
