//! Selection - an ordered list of nodes, jQuery style
//!
//! Semantics worth knowing:
//! - `find` searches inside the current nodes; `add` searches the whole document
//! - Results keep order: source node first, then document order within it
//! - Nothing is deduplicated unless you ask (`add_unique`, `add_selection_unique`)
//! - A selector that does not compile selects nothing

use crate::document::Document;
use crate::node::NodeRef;
use ahash::AHashSet;
use dom::NodeId;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Selection {
    nodes: Vec<NodeRef>,
    document: Arc<Document>,
}

impl Selection {
    /// Literal construction
    pub fn new(document: Arc<Document>, nodes: Vec<NodeRef>) -> Self {
        Self { nodes, document }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(NodeRef::id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodeRef> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.nodes.iter()
    }

    /// Matches for `selector` under each node of this selection
    ///
    /// Each source node is searched independently (the node itself
    /// included), and the results are concatenated in source order. Overlapping
    /// subtrees produce repeated matches.
    pub fn find(&self, selector: &str) -> Selection {
        let nodes = match self.document.compile(selector) {
            Some(matcher) => self
                .nodes
                .iter()
                .flat_map(|node| node.match_all(matcher.as_ref()))
                .collect(),
            None => Vec::new(),
        };
        Selection::new(Arc::clone(&self.document), nodes)
    }

    /// Call `f(index, node)` for every node in order, then return `self`
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(usize, &NodeRef),
    {
        for (i, node) in self.nodes.iter().enumerate() {
            f(i, node);
        }
        self
    }

    /// Append every match for `selector` in the whole document
    ///
    /// Nodes already present are appended again.
    pub fn add(&mut self, selector: &str) -> &mut Self {
        let found = self.document.find(selector);
        self.nodes.extend(found.nodes);
        self
    }

    /// Like [`Selection::add`], skipping nodes already in the selection
    pub fn add_unique(&mut self, selector: &str) -> &mut Self {
        let found = self.document.find(selector);
        self.extend_unique(found.nodes);
        self
    }

    /// Append all of `other`'s nodes, in its order. `other` is left untouched.
    ///
    /// No check is made that `other` belongs to the same document.
    pub fn add_selection(&mut self, other: &Selection) -> &mut Self {
        self.nodes.extend(other.nodes.iter().cloned());
        self
    }

    /// Like [`Selection::add_selection`], skipping nodes already present
    pub fn add_selection_unique(&mut self, other: &Selection) -> &mut Self {
        self.extend_unique(other.nodes.iter().cloned());
        self
    }

    fn extend_unique<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = NodeRef>,
    {
        let mut seen: AHashSet<(usize, NodeId)> = self.nodes.iter().map(NodeRef::key).collect();
        for node in nodes {
            if seen.insert(node.key()) {
                self.nodes.push(node);
            }
        }
    }

    /// Value of attribute `name` on the first node only
    ///
    /// `None` when the selection is empty or the first node lacks the
    /// attribute. Use [`Selection::each`] for the other nodes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.nodes.first()?.attr(name)
    }

    /// Combined text of every node, in selection order
    pub fn text(&self) -> String {
        self.nodes.iter().map(NodeRef::text).collect()
    }

    /// Inner HTML of the first node
    pub fn html(&self) -> Option<String> {
        self.nodes.first().map(NodeRef::inner_html)
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a NodeRef;
    type IntoIter = std::slice::Iter<'a, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("document", &self.document.url().as_str())
            .field("nodes", &self.nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const PAGE: &str = r#"<html><body><p id="a">x</p><p id="b">y</p></body></html>"#;

    fn doc(html: &str) -> Arc<Document> {
        Document::parse(html, Url::parse("http://example.test/").unwrap()).unwrap()
    }

    fn attr_ids(sel: &Selection) -> Vec<String> {
        sel.iter()
            .map(|n| n.attr("id").unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_find_then_attr() {
        let d = doc(PAGE);
        let sel = d.find("p");

        assert_eq!(attr_ids(&sel), vec!["a", "b"]);
        assert_eq!(sel.attr("id"), Some("a"));
        assert_eq!(sel.attr("class"), None);
    }

    #[test]
    fn test_add_duplicates() {
        let d = doc(PAGE);
        let mut sel = d.find("p");
        sel.add("p");

        assert_eq!(attr_ids(&sel), vec!["a", "b", "a", "b"]);
        assert_eq!(sel.get(0), sel.get(2));
    }

    #[test]
    fn test_add_unique_skips_present() {
        let d = doc(PAGE);
        let mut sel = d.find("#b");
        sel.add_unique("p");

        assert_eq!(attr_ids(&sel), vec!["b", "a"]);
    }

    #[test]
    fn test_add_searches_document_not_selection() {
        let d = doc(r#"<div id="d"><span id="in"></span></div><span id="out"></span>"#);
        let mut sel = d.find("#d");

        assert_eq!(attr_ids(&sel.find("span")), vec!["in"]);
        sel.add("span");
        assert_eq!(attr_ids(&sel), vec!["d", "in", "out"]);
    }

    #[test]
    fn test_find_orders_by_source_then_document() {
        let d = doc(
            r#"<ul id="u1"><li id="1"></li><li id="2"></li></ul>
               <ul id="u2"><li id="3"></li></ul>"#,
        );
        let mut lists = d.find("#u2");
        lists.add("#u1");

        assert_eq!(attr_ids(&lists.find("li")), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_find_overlapping_sources_repeat() {
        let d = doc(r#"<div id="outer"><div id="inner"><b id="x"></b></div></div>"#);
        let found = d.find("div").find("b");

        assert_eq!(attr_ids(&found), vec!["x", "x"]);
    }

    #[test]
    fn test_each_visits_in_order_and_chains() {
        let d = doc(PAGE);
        let sel = d.find("p");

        let mut seen = Vec::new();
        let first = sel
            .each(|i, node| seen.push((i, node.attr("id").unwrap().to_string())))
            .attr("id");

        assert_eq!(first, Some("a"));
        assert_eq!(seen, vec![(0, "a".to_string()), (1, "b".to_string())]);
    }

    #[test]
    fn test_empty_selection() {
        let d = doc(PAGE);
        let sel = d.find("table");

        assert!(sel.is_empty());
        assert_eq!(sel.attr("id"), None);
        assert_eq!(sel.html(), None);
        assert_eq!(sel.text(), "");
        assert!(sel.find("p").is_empty());
    }

    #[test]
    fn test_text_and_html() {
        let d = doc(PAGE);
        let sel = d.find("p");

        assert_eq!(sel.text(), "xy");
        assert_eq!(sel.html().as_deref(), Some("x"));
    }

    #[test]
    fn test_ids_match_nodes() {
        let d = doc(PAGE);
        let sel = d.find("p");
        let ids = sel.ids();

        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
        assert_eq!(ids[0], sel.nodes()[0].id());
    }
}
