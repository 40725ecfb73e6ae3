//! logos-based CSS tokenizer.
//!
//! The token set is deliberately coarse: the scoping/minification engine
//! never interprets property values, so everything that is not structural
//! punctuation, a string, or an at-keyword lexes as an opaque [`Token::Chunk`].
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins
//! 2. For equal length matches, earlier-defined variants win
//!
//! `Chunk` may not start with `@` (so `@media(x)` lexes as at-keyword plus
//! chunk, not one chunk) and never contains `:` (so the reconstruction pass
//! can decide colon spacing per context: significant in `div :hover`,
//! incidental in `color: red`).
//!
//! Byte spans are kept for every token. Whether two tokens were adjacent in
//! the source decides where minified output needs a space.

use logos::Logos;

/// CSS token produced by the lexer. Whitespace is skipped; comments are
/// stripped before tokenization (see [`crate::css::parser`]).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// Double- or single-quoted string literal, escapes allowed.
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    QuotedString,

    /// At-keyword introducing an at-rule: `@media`, `@import`, `@keyframes`.
    #[regex(r"@[a-zA-Z-]+")]
    AtKeyword,

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,

    /// `,`
    #[token(",")]
    Comma,

    /// Any other run of non-structural characters: selector fragments,
    /// property names, values, `url(...)`, `!important`, combinators.
    #[regex(r"[^@ \t\n\r\f{};:,'\x22][^ \t\n\r\f{};:,'\x22]*")]
    Chunk,
}

/// A token with its source text and byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct PToken {
    pub token: Token,
    pub text: String,
    /// Index in the token stream (for error reporting).
    pub pos: usize,
    /// Byte offset where this token starts in the source.
    pub byte_start: usize,
    /// Byte offset where this token ends in the source.
    pub byte_end: usize,
}

impl PToken {
    /// `true` if `next` follows this token with no whitespace or comment
    /// between them.
    pub fn adjacent_to(&self, next: &PToken) -> bool {
        self.byte_end == next.byte_start
    }
}

/// Tokenize CSS with span information preserved. Unlexable bytes (a stray
/// `@` and the like) are dropped.
pub fn tokenize(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    let mut idx = 0;

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span.clone()].to_string(),
                token,
                pos: idx,
                byte_start: span.start,
                byte_end: span.end,
            });
            idx += 1;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|t| t.token).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn simple_rule() {
        assert_eq!(
            kinds(".test { display: block; }"),
            vec![
                Token::Chunk,
                Token::BraceOpen,
                Token::Chunk,
                Token::Colon,
                Token::Chunk,
                Token::Semicolon,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn chunk_texts() {
        assert_eq!(texts(".card-title>b"), vec![".card-title>b"]);
    }

    #[test]
    fn pseudo_class_splits_on_colon() {
        assert_eq!(texts("a:hover"), vec!["a", ":", "hover"]);
    }

    #[test]
    fn at_keyword_not_swallowed_by_chunk() {
        let toks = tokenize("@media(max-width");
        assert_eq!(toks[0].token, Token::AtKeyword);
        assert_eq!(toks[0].text, "@media");
        assert_eq!(toks[1].token, Token::Chunk);
        assert_eq!(toks[1].text, "(max-width");
    }

    #[test]
    fn strings_are_single_tokens() {
        assert_eq!(
            kinds(r#"content: "a; b" 'c, d'"#),
            vec![
                Token::Chunk,
                Token::Colon,
                Token::QuotedString,
                Token::QuotedString,
            ]
        );
    }

    #[test]
    fn url_with_scheme_colon_rejoins_adjacently() {
        let toks = tokenize("url(http://x/y.png)");
        assert_eq!(toks.len(), 3);
        assert!(toks[0].adjacent_to(&toks[1]));
        assert!(toks[1].adjacent_to(&toks[2]));
    }

    #[test]
    fn adjacency_reflects_whitespace() {
        let toks = tokenize("div :hover");
        assert_eq!(toks.len(), 3);
        assert!(!toks[0].adjacent_to(&toks[1]));
        assert!(toks[1].adjacent_to(&toks[2]));
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").is_empty());
    }
}
