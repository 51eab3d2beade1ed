//! CSS selector compilation and matching
//!
//! Two seams:
//! - [`SelectorEngine`] compiles a selector string into a reusable [`Matcher`]
//! - [`Matcher`] tests nodes and collects matches in a subtree
//!
//! [`CssSelectorEngine`] is the stock engine, backed by the `selectors`
//! crate. The arena is exposed to it through [`ElementRef`], which
//! implements `selectors::Element`.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use cssparser::{Parser, ParserInput};
use selectors::attr::{
    AttrSelectorOperation, AttrSelectorOperator, CaseSensitivity, NamespaceConstraint,
};
use selectors::matching::{
    matches_selector, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};
use std::borrow::Cow;
use std::fmt;

/// Compiles selector strings into matchers
pub trait SelectorEngine: Send + Sync {
    fn compile(&self, selector: &str) -> Result<Box<dyn Matcher>>;
}

/// A compiled, reusable selector
pub trait Matcher: Send + Sync {
    /// Does this single node match
    fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool;

    /// All matches in the subtree rooted at `node_id`, in document order.
    /// The node itself is included when it matches.
    fn match_all(&self, arena: &DomArena, node_id: NodeId) -> Vec<NodeId> {
        let mut matches = Vec::new();
        let walked = arena.traverse_df(node_id, |node| {
            if self.matches(arena, node.node_id) {
                matches.push(node.node_id);
            }
            Ok(())
        });
        if let Err(e) = walked {
            tracing::debug!("Stopped matching at node {}: {}", node_id, e);
        }
        matches
    }
}

/// Stock engine: CSS selectors via the `selectors` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct CssSelectorEngine;

impl CssSelectorEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SelectorEngine for CssSelectorEngine {
    fn compile(&self, selector: &str) -> Result<Box<dyn Matcher>> {
        Ok(Box::new(CssMatcher::compile(selector)?))
    }
}

/// A parsed selector list
pub struct CssMatcher {
    source: String,
    selectors: SelectorList<SelectorImpl>,
}

impl CssMatcher {
    pub fn compile(selector: &str) -> Result<Self> {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);

        let selectors = SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
            .map_err(|e| DomError::InvalidSelector {
                selector: selector.to_string(),
                message: format!("{:?}", e.kind),
            })?;

        Ok(Self {
            source: selector.to_string(),
            selectors,
        })
    }

    fn matches_with(
        &self,
        element: &ElementRef<'_>,
        nth_index_cache: &mut NthIndexCache,
    ) -> bool {
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );

        self.selectors
            .0
            .iter()
            .any(|selector| matches_selector(selector, 0, None, element, &mut context))
    }
}

impl fmt::Debug for CssMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssMatcher")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Matcher for CssMatcher {
    fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        match ElementRef::new(arena, node_id) {
            Some(element) => self.matches_with(&element, &mut NthIndexCache::default()),
            None => false,
        }
    }

    /// Shares one nth-index cache across the whole walk
    fn match_all(&self, arena: &DomArena, node_id: NodeId) -> Vec<NodeId> {
        let mut nth_index_cache = NthIndexCache::default();
        let mut matches = Vec::new();

        let walked = arena.traverse_df(node_id, |node| {
            if node.is_element()
                && self.matches_with(&ElementRef { arena, node }, &mut nth_index_cache)
            {
                matches.push(node.node_id);
            }
            Ok(())
        });
        if let Err(e) = walked {
            tracing::debug!("Stopped matching at node {}: {}", node_id, e);
        }

        matches
    }
}

/// Parser hooks for the `selectors` crate
///
/// No namespaces, no non-tree-structural pseudo-classes or pseudo-elements:
/// those fall through to the crate's default "unsupported" errors.
pub struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = SelectorImpl;
    type Error = SelectorParseErrorKind<'i>;

    fn default_namespace(&self) -> Option<()> {
        None
    }

    fn namespace_for_prefix(&self, _prefix: &AttrString) -> Option<()> {
        None
    }
}

/// An element node seen through the `selectors::Element` trait
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    arena: &'a DomArena,
    node: &'a DomNode,
}

impl<'a> ElementRef<'a> {
    /// `None` unless `node_id` names an element
    pub fn new(arena: &'a DomArena, node_id: NodeId) -> Option<Self> {
        let node = arena.get(node_id).ok()?;
        node.is_element().then_some(Self { arena, node })
    }

    pub fn node(&self) -> &'a DomNode {
        self.node
    }

    fn wrap(&self, node: Option<&'a DomNode>) -> Option<Self> {
        node.filter(|n| n.is_element()).map(|node| Self {
            arena: self.arena,
            node,
        })
    }
}

impl<'a> fmt::Debug for ElementRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("node", &self.node.node_id)
            .field("tag", &self.node.node_name)
            .finish_non_exhaustive()
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = SelectorImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.arena.parent(self.node.node_id).ok().flatten();
        self.wrap(parent)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.wrap(self.arena.prev_sibling_element(self.node.node_id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.wrap(self.arena.next_sibling_element(self.node.node_id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.wrap(self.arena.element_children(self.node.node_id).next())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.node.node_name == local_name
    }

    fn has_namespace(&self, _ns: &()) -> bool {
        true
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.node.node_name == other.node.node_name
    }

    fn attr_matches(
        &self,
        _ns: &NamespaceConstraint<&()>,
        local_name: &AttrString,
        operation: &AttrSelectorOperation<&AttrString>,
    ) -> bool {
        // HTML attributes carry no namespace, so `[*|x]`, `[|x]` and `[x]` agree
        match self.node.attr(&local_name.0) {
            Some(actual) => attr_operation_matches(actual, operation),
            None => false,
        }
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: selectors::matching::ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.node.node_name.as_str(), "a" | "area" | "link") && self.node.has_attr("href")
    }

    fn is_html_slot_element(&self) -> bool {
        self.node.node_name == "slot"
    }

    fn has_id(&self, id: &AttrString, case_sensitivity: CaseSensitivity) -> bool {
        self.node
            .attr("id")
            .map_or(false, |attr_id| eq_with_case(attr_id, &id.0, case_sensitivity))
    }

    fn has_class(&self, name: &AttrString, case_sensitivity: CaseSensitivity) -> bool {
        self.node.attr("class").map_or(false, |classes| {
            classes
                .split_whitespace()
                .any(|class| eq_with_case(class, &name.0, case_sensitivity))
        })
    }

    fn imported_part(&self, _name: &AttrString) -> Option<AttrString> {
        None
    }

    fn is_part(&self, _name: &AttrString) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.node.children_ids.iter().all(|&id| match self.arena.get(id) {
            Ok(child) => match child.node_type {
                NodeType::Element => false,
                NodeType::Text | NodeType::CdataSection => child.node_value.is_empty(),
                _ => true,
            },
            Err(_) => true,
        })
    }

    fn is_root(&self) -> bool {
        match self.arena.parent(self.node.node_id) {
            Ok(Some(parent)) => parent.node_type == NodeType::Document,
            _ => false,
        }
    }
}

fn eq_with_case(a: &str, b: &str, case_sensitivity: CaseSensitivity) -> bool {
    match case_sensitivity {
        CaseSensitivity::CaseSensitive => a == b,
        CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
    }
}

fn attr_operation_matches(actual: &str, operation: &AttrSelectorOperation<&AttrString>) -> bool {
    let (operator, case_sensitivity, expected) = match operation {
        AttrSelectorOperation::Exists => return true,
        AttrSelectorOperation::WithValue {
            operator,
            case_sensitivity,
            value,
        } => (operator, case_sensitivity, value.0.as_str()),
    };

    let (actual, expected): (Cow<str>, Cow<str>) = match case_sensitivity {
        CaseSensitivity::CaseSensitive => (actual.into(), expected.into()),
        CaseSensitivity::AsciiCaseInsensitive => (
            actual.to_ascii_lowercase().into(),
            expected.to_ascii_lowercase().into(),
        ),
    };

    match operator {
        AttrSelectorOperator::Equal => actual == expected,
        AttrSelectorOperator::Includes => actual.split_whitespace().any(|part| part == expected),
        AttrSelectorOperator::DashMatch => {
            actual == expected
                || (actual.starts_with(&*expected)
                    && actual[expected.len()..].starts_with('-'))
        }
        AttrSelectorOperator::Prefix => {
            !expected.is_empty() && actual.starts_with(&*expected)
        }
        AttrSelectorOperator::Suffix => !expected.is_empty() && actual.ends_with(&*expected),
        AttrSelectorOperator::Substring => {
            !expected.is_empty() && actual.contains(&*expected)
        }
    }
}

/// String wrapper that implements ToCss
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttrString(pub String);

impl From<&str> for AttrString {
    fn from(s: &str) -> Self {
        AttrString(s.to_string())
    }
}

impl AsRef<str> for AttrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for AttrString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl cssparser::ToCss for AttrString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// Selector implementation types
#[derive(Debug, Clone, Copy)]
pub struct SelectorImpl;

impl selectors::SelectorImpl for SelectorImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = AttrString;
    type Identifier = AttrString;
    type LocalName = AttrString;
    type NamespacePrefix = AttrString;
    type NamespaceUrl = ();
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = ();
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Non-tree-structural pseudo-classes (none supported)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonTSPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = SelectorImpl;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

/// Pseudo-elements (none supported)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = SelectorImpl;
}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}
