//! Arena-based DOM tree storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! The arena replaces parent/child pointers with indices:
//! - Node identity is the index, so selections can hold plain `NodeId`s
//! - Traversals are iterative (no stack overflow on deep documents)
//! - Nodes stored sequentially in parse order, which is document order
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

/// Arena allocator for DOM nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's `node_id` is overwritten with its arena index.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Link `child` as the last child of `parent`
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.get(child_id)?;
        self.get_mut(parent_id)?.children_ids.push(child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self.root_id.ok_or(DomError::NoRoot)?;
        self.get(root_id)
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Element children only, in order
    pub fn element_children(&self, node_id: NodeId) -> impl Iterator<Item = &DomNode> + '_ {
        let ids = self
            .nodes
            .get(node_id as usize)
            .map(|n| n.children_ids.as_slice())
            .unwrap_or(&[]);
        ids.iter()
            .filter_map(|&id| self.nodes.get(id as usize))
            .filter(|n| n.is_element())
    }

    /// Closest preceding sibling that is an element
    pub fn prev_sibling_element(&self, node_id: NodeId) -> Option<&DomNode> {
        let siblings = self.siblings(node_id)?;
        let pos = siblings.iter().position(|&id| id == node_id)?;
        siblings[..pos]
            .iter()
            .rev()
            .filter_map(|&id| self.nodes.get(id as usize))
            .find(|n| n.is_element())
    }

    /// Closest following sibling that is an element
    pub fn next_sibling_element(&self, node_id: NodeId) -> Option<&DomNode> {
        let siblings = self.siblings(node_id)?;
        let pos = siblings.iter().position(|&id| id == node_id)?;
        siblings[pos + 1..]
            .iter()
            .filter_map(|&id| self.nodes.get(id as usize))
            .find(|n| n.is_element())
    }

    fn siblings(&self, node_id: NodeId) -> Option<&[NodeId]> {
        let parent_id = self.nodes.get(node_id as usize)?.parent_id?;
        self.nodes
            .get(parent_id as usize)
            .map(|p| p.children_ids.as_slice())
    }

    /// Traverse tree depth-first (iterative, no recursion)
    ///
    /// Pre-order: the start node is visited first, then its subtree in
    /// document order.
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }
}

/// Panics on an unknown id, like slice indexing. Use [`DomArena::get`] for ids
/// that did not come from this arena.
impl std::ops::Index<NodeId> for DomArena {
    type Output = DomNode;

    fn index(&self, node_id: NodeId) -> &DomNode {
        &self.nodes[node_id as usize]
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
