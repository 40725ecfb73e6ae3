//! Tree builder: turns the flat segment stream into a forest of nodes.
//!
//! Recovery rules for malformed input, in keeping with the tokenizer's
//! never-error contract: an unclosed element is closed implicitly at end of
//! input (or at a close tag belonging to an ancestor), and a close tag that
//! matches nothing open is dropped. The result is always a partial tree,
//! never an error.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::node::{is_void_tag, Element, Node};
use super::tokenizer::{segment, Segment, Tag};

type Segments = Peekable<IntoIter<Segment>>;

/// Parse markup text into an ordered forest of nodes.
pub fn parse(markup: &str) -> Vec<Node> {
    let mut segments = segment(markup).into_iter().peekable();
    build_forest(&mut segments)
}

/// Consume all remaining segments as top-level nodes. Stray close tags at
/// this level match nothing and are dropped.
fn build_forest(segments: &mut Segments) -> Vec<Node> {
    let mut nodes = Vec::new();
    while let Some(seg) = segments.next() {
        match seg {
            Segment::Text(text) => nodes.push(Node::text(text)),
            Segment::Open(tag) => nodes.push(build_element(segments, tag)),
            Segment::Close(_) => {}
        }
    }
    nodes
}

/// Build one element and its subtree. Void and self-closing tags take no
/// children; everything else consumes segments until its own close tag, end
/// of input, or a close tag belonging to an ancestor.
fn build_element(segments: &mut Segments, tag: Tag) -> Node {
    let mut element = Element {
        tag: tag.name,
        attributes: tag.attributes,
        children: Vec::new(),
    };

    if tag.self_closing || is_void_tag(&element.tag) {
        return element.into();
    }

    enum Step {
        End,
        ConsumeClose,
        Child,
    }

    loop {
        let step = match segments.peek() {
            None => Step::End,
            Some(Segment::Close(name)) if *name == element.tag => Step::ConsumeClose,
            Some(Segment::Close(_)) => Step::End,
            Some(_) => Step::Child,
        };
        match step {
            Step::End => break,
            Step::ConsumeClose => {
                segments.next();
                break;
            }
            Step::Child => match segments.next() {
                Some(Segment::Text(text)) => element.children.push(Node::text(text)),
                Some(Segment::Open(tag)) => {
                    let child = build_element(segments, tag);
                    element.children.push(child);
                }
                _ => unreachable!("peeked a child segment"),
            },
        }
    }

    element.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(markup: &str) -> Element {
        let nodes = parse(markup);
        assert_eq!(nodes.len(), 1, "expected one root node in {markup:?}");
        match nodes.into_iter().next().unwrap() {
            Node::Element(el) => el,
            Node::Text(t) => panic!("expected element, got text {:?}", t.text),
        }
    }

    #[test]
    fn nested_elements() {
        let el = parse_one("<div><span>a</span><span>b</span></div>");
        assert_eq!(el.tag, "div");
        assert_eq!(el.children.len(), 2);
        let first = el.children[0].as_element().unwrap();
        assert_eq!(first.tag, "span");
        assert_eq!(first.children[0].as_text(), Some("a"));
    }

    #[test]
    fn attributes_land_on_element() {
        let el = parse_one(r#"<a href="/home" download>x</a>"#);
        assert_eq!(el.attr("href"), Some("/home"));
        assert_eq!(el.attr("download"), Some(""));
    }

    #[test]
    fn void_tag_takes_no_children() {
        let el = parse_one("<div><br>after</div>");
        assert_eq!(el.children.len(), 2);
        assert_eq!(el.children[0].as_element().unwrap().tag, "br");
        assert_eq!(el.children[1].as_text(), Some("after"));
    }

    #[test]
    fn self_closing_component_tag() {
        let el = parse_one("<div><widgets.card title=\"hi\"/>tail</div>");
        let card = el.children[0].as_element().unwrap();
        assert_eq!(card.tag, "widgets.card");
        assert_eq!(card.attr("title"), Some("hi"));
        assert!(card.children.is_empty());
    }

    #[test]
    fn multiple_roots() {
        let nodes = parse("<template><div/></template><title>Hi</title>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].as_element().unwrap().tag, "template");
        assert_eq!(nodes[1].as_element().unwrap().tag, "title");
    }

    #[test]
    fn script_child_is_single_raw_text() {
        let el = parse_one("<script>let a = 1 < 2;</script>");
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.children[0].as_text(), Some("let a = 1 < 2;"));
    }

    // ── Recovery ─────────────────────────────────────────────────────

    #[test]
    fn unclosed_element_closes_at_eof() {
        let el = parse_one("<div><span>a");
        assert_eq!(el.children.len(), 1);
        let span = el.children[0].as_element().unwrap();
        assert_eq!(span.children[0].as_text(), Some("a"));
    }

    #[test]
    fn ancestor_close_implicitly_closes_child() {
        let el = parse_one("<div><span>a</div>");
        let span = el.children[0].as_element().unwrap();
        assert_eq!(span.tag, "span");
        assert_eq!(span.children[0].as_text(), Some("a"));
    }

    #[test]
    fn stray_close_is_dropped() {
        let nodes = parse("</div><p>x</p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_element().unwrap().tag, "p");
    }

    #[test]
    fn text_only_input() {
        let nodes = parse("just text");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_text(), Some("just text"));
    }

    #[test]
    fn expression_with_markup_stays_text() {
        let el = parse_one("<p>{items.map(i => <b>{i}</b>)}</p>");
        assert_eq!(el.children.len(), 1);
        assert_eq!(
            el.children[0].as_text(),
            Some("{items.map(i => <b>{i}</b>)}")
        );
    }
}
