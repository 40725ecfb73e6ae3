//! Forest-to-HTML serialization.
//!
//! Text and attribute values are escaped (`<`, `>`, `"`, `'`), except
//! between the paired trusted-HTML sentinels, which pass through verbatim
//! with the markers removed. Two reserved tag names expand to Outlook
//! conditional-comment syntax so email markup can target Outlook without
//! hand-writing comment soup.

use super::node::{is_void_tag, Element, Node};

/// Opens a trusted-HTML region inside a text node. Content between the pair
/// serializes unescaped. Private-use codepoints, so no real document text
/// collides with them.
pub const RAW_HTML_OPEN: &str = "\u{e000}";

/// Closes a trusted-HTML region.
pub const RAW_HTML_CLOSE: &str = "\u{e001}";

/// Wrap pre-serialized HTML in the trusted passthrough sentinels.
pub fn raw_html(html: &str) -> String {
    format!("{RAW_HTML_OPEN}{html}{RAW_HTML_CLOSE}")
}

/// Serialize a forest to HTML text.
pub fn to_xml(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(t) => escape_into(out, &t.text),
            Node::Element(el) => write_element(out, el),
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    // Reserved macro tags expand to Outlook conditional comments.
    match el.tag.as_str() {
        "outlook" => {
            out.push_str("<!--[if mso]>");
            write_nodes(out, &el.children);
            out.push_str("<![endif]-->");
            return;
        }
        "not-outlook" => {
            out.push_str("<!--[if !mso]><!-- -->");
            write_nodes(out, &el.children);
            out.push_str("<!--<![endif]-->");
            return;
        }
        _ => {}
    }

    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value);
        out.push('"');
    }

    if is_void_tag(&el.tag) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_nodes(out, &el.children);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Escape `text` into `out`, passing trusted-HTML regions through verbatim.
/// An unterminated open sentinel trusts the rest of the text.
fn escape_into(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(start) = rest.find(RAW_HTML_OPEN) {
        escape_plain(out, &rest[..start]);
        let trusted = &rest[start + RAW_HTML_OPEN.len()..];
        match trusted.find(RAW_HTML_CLOSE) {
            Some(end) => {
                out.push_str(&trusted[..end]);
                rest = &trusted[end + RAW_HTML_CLOSE.len()..];
            }
            None => {
                out.push_str(trusted);
                return;
            }
        }
    }
    escape_plain(out, rest);
}

fn escape_plain(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
