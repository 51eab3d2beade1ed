//! DOM Serializer - Convert arena nodes back to HTML markup
//!
//! This module handles:
//! - Inner / outer HTML of a single node
//! - Escaping of text and attribute values
//! - Void elements (no closing tag) and raw-text elements (no escaping)

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Pending work for the serializer loop
enum Step<'a> {
    /// Write a node; `raw` when its parent is a raw-text element
    Node { id: NodeId, raw: bool },
    EndTag(&'a str),
}

/// HTML serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSerializer;

impl DomSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Markup of the node itself plus its subtree
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let raw = arena
            .parent(node_id)?
            .map_or(false, is_raw_text_element);
        let mut output = String::with_capacity(256);
        self.write(arena, vec![Step::Node { id: node_id, raw }], &mut output)?;
        Ok(output)
    }

    /// Markup of the node's children only
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let node = arena.get(node_id)?;
        let mut steps = Vec::new();
        push_children(node, &mut steps);
        let mut output = String::with_capacity(256);
        self.write(arena, steps, &mut output)?;
        Ok(output)
    }

    /// Drain `steps` (a stack, last item written first) into `output`
    fn write<'a>(
        &self,
        arena: &'a DomArena,
        mut steps: Vec<Step<'a>>,
        output: &mut String,
    ) -> Result<()> {
        while let Some(step) = steps.pop() {
            let (node_id, raw) = match step {
                Step::EndTag(name) => {
                    output.push_str("</");
                    output.push_str(name);
                    output.push('>');
                    continue;
                }
                Step::Node { id, raw } => (id, raw),
            };
            let node = arena.get(node_id)?;

            match node.node_type {
                NodeType::Element => {
                    output.push('<');
                    output.push_str(&node.node_name);
                    for attr in &node.attributes {
                        output.push(' ');
                        output.push_str(&attr.name);
                        output.push_str("=\"");
                        escape_into(&attr.value, true, output);
                        output.push('"');
                    }
                    output.push('>');

                    if VOID_ELEMENTS.contains(&node.node_name.as_str()) {
                        continue;
                    }
                    steps.push(Step::EndTag(&node.node_name));
                    push_children(node, &mut steps);
                }
                NodeType::Text if raw => output.push_str(&node.node_value),
                NodeType::Text => escape_into(&node.node_value, false, output),
                NodeType::Comment => {
                    output.push_str("<!--");
                    output.push_str(&node.node_value);
                    output.push_str("-->");
                }
                NodeType::DocumentType => {
                    output.push_str("<!DOCTYPE ");
                    output.push_str(&node.node_name);
                    output.push('>');
                }
                NodeType::Document | NodeType::DocumentFragment => {
                    push_children(node, &mut steps);
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Schedule `node`'s children, first child on top
///
/// Text directly inside script, style and friends is written unescaped.
fn push_children(node: &DomNode, steps: &mut Vec<Step<'_>>) {
    let raw = is_raw_text_element(node);
    steps.extend(
        node.children_ids
            .iter()
            .rev()
            .map(|&id| Step::Node { id, raw }),
    );
}

fn is_raw_text_element(node: &DomNode) -> bool {
    node.is_element() && RAW_TEXT_ELEMENTS.contains(&node.node_name.as_str())
}

fn escape_into(text: &str, in_attribute: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if in_attribute => output.push_str("&quot;"),
            '<' if !in_attribute => output.push_str("&lt;"),
            '>' if !in_attribute => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::HtmlParser;

    fn first(arena: &DomArena, tag: &str) -> NodeId {
        arena
            .iter()
            .find(|n| n.tag_name() == Some(tag))
            .map(|n| n.node_id)
            .unwrap()
    }

    #[test]
    fn test_outer_and_inner_html() {
        let arena = HtmlParser::new()
            .parse_str(r#"<div class="x"><p>Hi <b>there</b></p><br></div>"#)
            .unwrap();
        let div = first(&arena, "div");
        let serializer = DomSerializer::new();

        assert_eq!(
            serializer.outer_html(&arena, div).unwrap(),
            r#"<div class="x"><p>Hi <b>there</b></p><br></div>"#
        );
        assert_eq!(
            serializer.inner_html(&arena, div).unwrap(),
            "<p>Hi <b>there</b></p><br>"
        );
    }

    #[test]
    fn test_escaping() {
        let arena = HtmlParser::new()
            .parse_str(r#"<p title="a &quot;q&quot; &amp; b">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#)
            .unwrap();
        let p = first(&arena, "p");

        assert_eq!(
            DomSerializer::new().outer_html(&arena, p).unwrap(),
            r#"<p title="a &quot;q&quot; &amp; b">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn test_script_is_raw_text() {
        let arena = HtmlParser::new()
            .parse_str("<script>if (a < b && c) {}</script>")
            .unwrap();
        let script = first(&arena, "script");

        assert_eq!(
            DomSerializer::new().inner_html(&arena, script).unwrap(),
            "if (a < b && c) {}"
        );
        assert_eq!(
            DomSerializer::new().outer_html(&arena, script).unwrap(),
            "<script>if (a < b && c) {}</script>"
        );

        let text = arena.get(script).unwrap().children_ids[0];
        assert_eq!(
            DomSerializer::new().outer_html(&arena, text).unwrap(),
            "if (a < b && c) {}"
        );
    }

    #[test]
    fn test_raw_text_stops_at_the_element() {
        let arena = HtmlParser::new()
            .parse_str("<div><style>a > b {}</style>x > y</div>")
            .unwrap();
        let div = first(&arena, "div");

        assert_eq!(
            DomSerializer::new().inner_html(&arena, div).unwrap(),
            "<style>a > b {}</style>x &gt; y"
        );
    }

    #[test]
    fn test_deeply_nested_serialization() {
        const DEPTH: usize = 50_000;
        let html = "<div>".repeat(DEPTH) + "x";
        let arena = HtmlParser::new().parse_str(&html).unwrap();
        let outer = first(&arena, "div");

        let expected = "<div>".repeat(DEPTH - 1) + "x" + &"</div>".repeat(DEPTH - 1);
        assert_eq!(DomSerializer::new().inner_html(&arena, outer).unwrap(), expected);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let arena = HtmlParser::new().parse_str("<p>x</p>").unwrap();
        let missing = arena.len() as NodeId + 5;

        assert!(DomSerializer::new().outer_html(&arena, missing).is_err());
        assert!(DomSerializer::new().inner_html(&arena, missing).is_err());
    }
}
