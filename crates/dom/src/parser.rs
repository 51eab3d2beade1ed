//! HTML Parser - builds a `DomArena` from markup
//!
//! Uses html5ever's built-in RcDom and converts it into the arena format.
//! This is simpler and more reliable than implementing TreeSink directly.
//!
//! This handles:
//! - Byte stream decoding (lossy UTF-8)
//! - Tree construction per the HTML5 algorithm (html5ever never rejects markup)
//! - Conversion into index-linked `DomNode`s in document order

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Configuration for the HTML parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Keep text nodes that contain only whitespace
    pub keep_whitespace_text: bool,
    pub keep_comments: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            keep_whitespace_text: true,
            keep_comments: true,
        }
    }
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    config: ParserConfig,
}

impl HtmlParser {
    /// Create new parser with default config
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create parser with custom config
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a byte stream into a fresh arena
    ///
    /// The reader is drained completely. The only failure is an I/O error
    /// while reading; malformed markup is recovered per the HTML5 rules.
    pub fn parse_document<R: Read>(&self, reader: &mut R) -> Result<DomArena> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(reader)?;

        let mut arena = DomArena::new();
        if let Some(root_id) = self.convert_tree(&mut arena, &dom.document)? {
            arena.set_root(root_id)?;
        }

        tracing::debug!("Parsed {} nodes", arena.len());
        Ok(arena)
    }

    /// Parse an in-memory string
    pub fn parse_str(&self, html: &str) -> Result<DomArena> {
        self.parse_document(&mut html.as_bytes())
    }

    /// Copy the RcDom tree into the arena, returning the root's id
    ///
    /// Walks with an explicit stack so nesting depth is bounded by the heap,
    /// not the call stack. Children are pushed in reverse to keep ids in
    /// document order. Nodes the config filters out are skipped along with
    /// their subtrees.
    fn convert_tree(&self, arena: &mut DomArena, document: &Handle) -> Result<Option<NodeId>> {
        let mut root_id = None;
        let mut stack: Vec<(Handle, Option<NodeId>)> = vec![(document.clone(), None)];

        while let Some((handle, parent_id)) = stack.pop() {
            let Some(node) = self.convert_node(&handle) else {
                continue;
            };

            let node_id = arena.add_node(node);
            match parent_id {
                Some(parent_id) => arena.append_child(parent_id, node_id)?,
                None => root_id = Some(node_id),
            }

            for child in handle.children.borrow().iter().rev() {
                stack.push((child.clone(), Some(node_id)));
            }
        }

        Ok(root_id)
    }

    /// Arena node for a single RcDom node, `None` if the config drops it
    fn convert_node(&self, handle: &Handle) -> Option<DomNode> {
        let node = match &handle.data {
            NodeData::Document => {
                DomNode::new(0, NodeType::Document, "#document".to_string())
            }
            NodeData::Doctype { name, .. } => {
                DomNode::new(0, NodeType::DocumentType, name.to_string())
            }
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if !self.config.keep_whitespace_text && text.trim().is_empty() {
                    return None;
                }
                DomNode::text(0, text)
            }
            NodeData::Comment { contents } => {
                if !self.config.keep_comments {
                    return None;
                }
                let mut node = DomNode::new(0, NodeType::Comment, "#comment".to_string());
                node.node_value = contents.to_string();
                node
            }
            NodeData::Element { name, attrs, .. } => {
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| {
                        let local = attr.name.local.to_string();
                        let name = match &attr.name.prefix {
                            Some(prefix) => format!("{}:{}", prefix, local),
                            None => local,
                        };
                        Attribute::new(name, attr.value.to_string())
                    })
                    .collect();
                DomNode::element(0, name.local.to_string(), attributes)
            }
            // Ignore processing instructions
            NodeData::ProcessingInstruction { .. } => return None,
        };
        Some(node)
    }
}
