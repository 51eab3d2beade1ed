//! Core node type definitions
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Attributes keep source order, lookups return the first match
//! 3. Use SmallVec for small arrays (avoid heap allocation)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

/// A single `name="value"` pair on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Immutable once the owning arena is handed to a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType, // 1 byte

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Lowercase local name for elements, `#text` / `#comment` / `#document` otherwise
    pub node_name: String,
    /// Character data for text and comment nodes
    pub node_value: String,
    pub attributes: Vec<Attribute>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            node_name,
            node_value: String::new(),
            attributes: Vec::new(),
            parent_id: None,
            children_ids: SmallVec::new(),
        }
    }

    pub fn element(node_id: NodeId, tag: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        let mut node = Self::new(node_id, NodeType::Element, tag.into());
        node.attributes = attributes;
        node
    }

    pub fn text(node_id: NodeId, value: impl Into<String>) -> Self {
        let mut node = Self::new(node_id, NodeType::Text, "#text".to_string());
        node.node_value = value.into();
        node
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    ///
    /// Scans in source order and stops at the first key match.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_first_match_wins() {
        let node = DomNode::element(
            0,
            "input",
            vec![
                Attribute::new("name", "first"),
                Attribute::new("type", "text"),
                Attribute::new("name", "second"),
            ],
        );

        assert_eq!(node.attr("name"), Some("first"));
        assert_eq!(node.attr("type"), Some("text"));
        assert_eq!(node.attr("value"), None);
        assert!(node.has_attr("type"));
    }

    #[test]
    fn test_tag_name_only_for_elements() {
        let text = DomNode::text(1, "hello");
        assert_eq!(text.tag_name(), None);
        assert!(text.is_text());

        let div = DomNode::element(2, "div", Vec::new());
        assert_eq!(div.tag_name(), Some("div"));
        assert!(div.is_element());
    }

    #[test]
    fn test_node_serializes() {
        let node = DomNode::element(3, "a", vec![Attribute::new("href", "/x")]);
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["node_name"], "a");
        assert_eq!(json["node_type"], "Element");
        assert_eq!(json["attributes"][0]["value"], "/x");
    }
}
