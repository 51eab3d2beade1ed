//! Document - a parsed node tree plus the address it came from
//!
//! Documents are built once and never mutated. They are shared as
//! `Arc<Document>`: every `Selection` and `NodeRef` keeps its document alive.

use crate::error::{QueryError, Result};
use crate::fetch::{HttpClient, HttpResponse, ReqwestClient};
use crate::node::NodeRef;
use crate::selection::Selection;
use dom::{CssSelectorEngine, DomArena, HtmlParser, Matcher, NodeId, SelectorEngine};
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use url::Url;

pub struct Document {
    arena: DomArena,
    url: Url,
    engine: Arc<dyn SelectorEngine>,
}

impl Document {
    /// Wrap an already-built tree, using the CSS selector engine
    pub fn new(arena: DomArena, url: Url) -> Self {
        Self {
            arena,
            url,
            engine: Arc::new(CssSelectorEngine::new()),
        }
    }

    /// Substitute the selector engine used by every query on this document
    pub fn with_engine(mut self, engine: Arc<dyn SelectorEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Fetch `address` over HTTP and parse the response body
    ///
    /// The document's URL is the resolved one, after redirects.
    pub fn construct(address: &str) -> Result<Arc<Self>> {
        let client = ReqwestClient::new()?;
        Self::construct_with(address, &client)
    }

    /// Like [`Document::construct`], with a caller-supplied HTTP collaborator
    pub fn construct_with(address: &str, client: &dyn HttpClient) -> Result<Arc<Self>> {
        let HttpResponse { url, mut body } = client.get(address)?;
        // body is released when this frame returns, parsed or not
        Self::from_reader(&mut body, url)
    }

    /// Parse a byte stream already in hand, reading it to the end
    pub fn from_reader<R: Read>(reader: &mut R, url: Url) -> Result<Arc<Self>> {
        let arena = HtmlParser::new()
            .parse_document(reader)
            .map_err(QueryError::Parse)?;
        tracing::debug!("Built document for {} ({} nodes)", url, arena.len());
        Ok(Arc::new(Self::new(arena, url)))
    }

    /// Parse an in-memory string
    pub fn parse(html: &str, url: Url) -> Result<Arc<Self>> {
        Self::from_reader(&mut html.as_bytes(), url)
    }

    /// Resolved address of the document
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.arena.root_id()
    }

    pub fn root(self: &Arc<Self>) -> Option<NodeRef> {
        self.root_id().map(|id| NodeRef::new(Arc::clone(self), id))
    }

    /// Reference to a node by id, `None` if the id is not in this document
    pub fn node(self: &Arc<Self>, id: NodeId) -> Option<NodeRef> {
        self.arena.get(id).ok()?;
        Some(NodeRef::new(Arc::clone(self), id))
    }

    /// All matches for `selector` in the whole tree, in document order
    ///
    /// A selector that does not compile yields an empty selection.
    pub fn find(self: &Arc<Self>, selector: &str) -> Selection {
        let nodes = match (self.compile(selector), self.root()) {
            (Some(matcher), Some(root)) => root.match_all(matcher.as_ref()),
            _ => Vec::new(),
        };
        Selection::new(Arc::clone(self), nodes)
    }

    /// Compile with this document's engine
    ///
    /// The one place selector errors are swallowed: they are logged and
    /// reported as `None`, which callers treat as "no matches".
    pub(crate) fn compile(&self, selector: &str) -> Option<Box<dyn Matcher>> {
        match self.engine.compile(selector) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                tracing::warn!("Ignoring selector {:?}: {}", selector, e);
                None
            }
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url.as_str())
            .field("nodes", &self.arena.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomError, DomNode, NodeType};

    fn url() -> Url {
        Url::parse("http://example.test/").unwrap()
    }

    /// Matches nothing, compiles anything except "!"
    struct NothingEngine;

    struct NothingMatcher;

    impl Matcher for NothingMatcher {
        fn matches(&self, _arena: &DomArena, _node_id: NodeId) -> bool {
            false
        }
    }

    impl SelectorEngine for NothingEngine {
        fn compile(&self, selector: &str) -> dom::Result<Box<dyn Matcher>> {
            if selector == "!" {
                return Err(DomError::InvalidSelector {
                    selector: selector.to_string(),
                    message: "bang".to_string(),
                });
            }
            Ok(Box::new(NothingMatcher))
        }
    }

    #[test]
    fn test_find_whole_tree() {
        let doc = Document::parse("<p>a</p><div><p>b</p></div>", url()).unwrap();
        let sel = doc.find("p");

        assert_eq!(sel.len(), 2);
        assert!(Arc::ptr_eq(sel.document(), &doc));
    }

    #[test]
    fn test_bad_selector_is_empty_not_error() {
        let doc = Document::parse("<p>a</p>", url()).unwrap();
        let sel = doc.find("p[");

        assert!(sel.is_empty());
        assert!(Arc::ptr_eq(sel.document(), &doc));
    }

    #[test]
    fn test_substituted_engine() {
        let arena = dom::HtmlParser::new().parse_str("<p>a</p>").unwrap();
        let doc = Arc::new(Document::new(arena, url()).with_engine(Arc::new(NothingEngine)));

        assert!(doc.find("p").is_empty());
        assert!(doc.find("!").is_empty());
    }

    #[test]
    fn test_rootless_tree_selects_nothing() {
        let mut arena = DomArena::new();
        arena.add_node(DomNode::new(0, NodeType::Element, "p".into()));
        let doc = Arc::new(Document::new(arena, url()));

        assert!(doc.root().is_none());
        assert!(doc.find("p").is_empty());
    }

    #[test]
    fn test_node_lookup_validates_id() {
        let doc = Document::parse("<p>a</p>", url()).unwrap();
        assert!(doc.node(0).is_some());
        assert!(doc.node(10_000).is_none());
    }
}
