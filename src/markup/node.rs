//! Node model: the Element/Text tree plus HTML tag tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute map of an element. `BTreeMap` keeps serialized output and
/// attribute iteration deterministic.
pub type Attributes = BTreeMap<String, String>;

/// A node in the markup tree: either an element or a run of text.
///
/// Serialized untagged, so the JSON shape is `{tag, attributes, children}`
/// for elements and `{text}` for text nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// An element node: tag name, attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

impl Node {
    /// Create an element node with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(Element::new(tag))
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text { text: text.into() })
    }

    /// The element behind this node, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// The text behind this node, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(&t.text),
            Node::Element(_) => None,
        }
    }
}

impl Element {
    /// Create an element with the given tag and no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child node (builder).
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The single text child of this element, if its children are exactly
    /// one text node.
    pub fn only_text_child(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Text(t)] => Some(&t.text),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

// ---------------------------------------------------------------------------
// Tag tables
// ---------------------------------------------------------------------------

/// Void elements: no children, no close tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

/// Standard HTML element names. Elements outside this set are treated as
/// component references and are not stamped with a style specifier.
const HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base",
    "bdi", "bdo", "blockquote", "body", "br", "button", "canvas", "caption",
    "cite", "code", "col", "colgroup", "data", "datalist", "dd", "del",
    "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img",
    "input", "ins", "kbd", "label", "legend", "li", "link", "main", "map",
    "mark", "menu", "meta", "meter", "nav", "noscript", "object", "ol",
    "optgroup", "option", "output", "p", "picture", "pre", "progress", "q",
    "rp", "rt", "ruby", "s", "samp", "script", "section", "select", "slot",
    "small", "source", "span", "strong", "style", "sub", "summary", "sup",
    "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead",
    "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

/// Returns `true` for void elements (`<br>`, `<img>`, ...): they take no
/// children and serialize self-closed.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Returns `true` if `tag` is a standard HTML element name.
pub fn is_html_tag(tag: &str) -> bool {
    HTML_TAGS.binary_search(&tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_builder() {
        let el = Element::new("div")
            .with_attr("class", "hero")
            .with_child(Node::text("hi"));
        assert_eq!(el.tag, "div");
        assert_eq!(el.attr("class"), Some("hero"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn only_text_child() {
        let el = Element::new("title").with_child(Node::text("Home"));
        assert_eq!(el.only_text_child(), Some("Home"));

        let el = Element::new("title")
            .with_child(Node::text("Home"))
            .with_child(Node::element("b"));
        assert_eq!(el.only_text_child(), None);

        let el = Element::new("title");
        assert_eq!(el.only_text_child(), None);
    }

    #[test]
    fn node_accessors() {
        let el = Node::element("div");
        assert!(el.as_element().is_some());
        assert!(el.as_text().is_none());

        let txt = Node::text("x");
        assert_eq!(txt.as_text(), Some("x"));
        assert!(txt.as_element().is_none());
    }

    #[test]
    fn void_tags() {
        assert!(is_void_tag("br"));
        assert!(is_void_tag("img"));
        assert!(!is_void_tag("div"));
        assert!(!is_void_tag("span"));
    }

    #[test]
    fn html_tags_is_sorted_for_binary_search() {
        let mut sorted = HTML_TAGS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, HTML_TAGS);
    }

    #[test]
    fn html_tag_lookup() {
        assert!(is_html_tag("div"));
        assert!(is_html_tag("wbr"));
        assert!(is_html_tag("a"));
        assert!(!is_html_tag("widgets.button"));
        assert!(!is_html_tag("for"));
        assert!(!is_html_tag("children"));
    }

    // ── Serde shape ──────────────────────────────────────────────────

    #[test]
    fn serialize_element_shape() {
        let node = Node::Element(Element::new("div").with_attr("id", "x"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tag": "div",
                "attributes": {"id": "x"},
                "children": []
            })
        );
    }

    #[test]
    fn serialize_text_shape() {
        let node = Node::text("hello");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn round_trip_through_json() {
        let tree = Node::Element(
            Element::new("ul")
                .with_attr("class", "list")
                .with_child(Node::Element(
                    Element::new("li").with_child(Node::text("one")),
                ))
                .with_child(Node::text("tail")),
        );
        let json = serde_json::to_string(&tree).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
