//! Markup engine: tokenizer, tree builder, node model, serialization.

pub mod node;
pub mod parser;
pub mod serialize;
pub mod tokenizer;

pub use node::{is_html_tag, is_void_tag, Attributes, Element, Node, Text};
pub use parser::parse;
pub use serialize::{raw_html, to_xml, RAW_HTML_CLOSE, RAW_HTML_OPEN};
