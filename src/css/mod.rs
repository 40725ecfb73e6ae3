//! CSS engine: tokenizer, parser, scoping, minification.

pub mod model;
pub mod parser;
pub mod scoper;
pub mod tokenizer;

pub use parser::{parse_css, ParseError};
pub use scoper::{
    compile_css, content_hash, no_hash, CssOutput, NO_HASH_CLOSE, NO_HASH_OPEN, SPECIFIER_ATTR,
};
