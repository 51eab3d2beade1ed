//! NodeRef - a node together with the document that owns it
//!
//! Identity is (document, node id): two refs are equal only when they
//! point at the same node of the same document.

use crate::document::Document;
use dom::{utils, DomNode, DomSerializer, Matcher, NodeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct NodeRef {
    document: Arc<Document>,
    id: NodeId,
}

impl NodeRef {
    /// `id` must belong to `document`
    pub(crate) fn new(document: Arc<Document>, id: NodeId) -> Self {
        Self { document, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn node(&self) -> &DomNode {
        &self.document.arena()[self.id]
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.node()
            .parent_id
            .map(|id| NodeRef::new(Arc::clone(&self.document), id))
    }

    /// Combined text of this node and its descendants
    pub fn text(&self) -> String {
        utils::get_text_content(self.document.arena(), self.id).unwrap_or_default()
    }

    /// Markup of the children
    pub fn inner_html(&self) -> String {
        DomSerializer::new()
            .inner_html(self.document.arena(), self.id)
            .unwrap_or_default()
    }

    /// Markup of the node itself
    pub fn outer_html(&self) -> String {
        DomSerializer::new()
            .outer_html(self.document.arena(), self.id)
            .unwrap_or_default()
    }

    /// Matches within this node's subtree, in document order
    pub(crate) fn match_all(&self, matcher: &dyn Matcher) -> Vec<NodeRef> {
        matcher
            .match_all(self.document.arena(), self.id)
            .into_iter()
            .map(|id| NodeRef::new(Arc::clone(&self.document), id))
            .collect()
    }

    /// Hashable identity key
    pub(crate) fn key(&self) -> (usize, NodeId) {
        (Arc::as_ptr(&self.document) as *const () as usize, self.id)
    }
}

impl Deref for NodeRef {
    type Target = DomNode;

    fn deref(&self) -> &DomNode {
        self.node()
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.document, &other.document)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        let mut s = f.debug_struct("NodeRef");
        s.field("id", &self.id).field("name", &node.node_name);
        if let Some(id) = node.attr("id") {
            s.field("attr_id", &id);
        }
        s.finish()
    }
}
