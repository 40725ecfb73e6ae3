//! Recursive descent CSS parser.
//!
//! Parses CSS text into a [`Rule`] list using the coarse tokenizer from
//! [`crate::css::tokenizer`]. Output strings are rebuilt from the tokens, so
//! comments and incidental whitespace are gone by construction: a space is
//! emitted only where the source had one *and* the grammar gives it meaning
//! (between value tokens, before a selector's `:`), never around structural
//! punctuation.

use crate::css::model::{MediaRule, OtherRule, Rule, StyleRule};
use crate::css::tokenizer::{tokenize, PToken, Token};

/// Errors from CSS parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// Strip CSS block comments (`/* ... */`), replacing each comment with a
/// single space so adjacency decisions stay intact. An unterminated comment
/// consumes the rest of the input.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

/// Parse a CSS string into a rule list.
pub fn parse_css(input: &str) -> Result<Vec<Rule>, ParseError> {
    let cleaned = strip_comments(input);
    let mut parser = Parser {
        tokens: tokenize(&cleaned),
        cursor: 0,
    };
    parser.parse_rules(false)
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<(Token, usize)> {
        self.peek().map(|t| (t.token, t.pos))
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    /// Parse rules until end of input (`nested == false`) or a closing brace
    /// (`nested == true`, brace consumed).
    fn parse_rules(&mut self, nested: bool) -> Result<Vec<Rule>, ParseError> {
        let mut rules = Vec::new();
        loop {
            match self.peek_kind() {
                None => {
                    if nested {
                        return Err(ParseError::UnexpectedEof("expected '}'".into()));
                    }
                    return Ok(rules);
                }
                Some((Token::BraceClose, pos)) => {
                    if nested {
                        self.advance();
                        return Ok(rules);
                    }
                    return Err(ParseError::UnexpectedToken {
                        position: pos,
                        message: "unmatched '}'".into(),
                    });
                }
                Some((Token::AtKeyword, _)) => rules.push(self.parse_at_rule()?),
                Some(_) => rules.push(self.parse_style_rule()?),
            }
        }
    }

    /// `selector, selector { declarations }`.
    fn parse_style_rule(&mut self) -> Result<Rule, ParseError> {
        let mut selectors = Vec::new();
        let mut current: Vec<PToken> = Vec::new();
        let mut paren_depth = 0i32;

        loop {
            let Some(tok) = self.peek().cloned() else {
                return Err(ParseError::UnexpectedEof(
                    "expected '{' after selector".into(),
                ));
            };
            match tok.token {
                Token::BraceOpen => {
                    self.advance();
                    break;
                }
                Token::Comma if paren_depth == 0 => {
                    self.advance();
                    if !current.is_empty() {
                        selectors.push(minify_selector(&current));
                        current.clear();
                    }
                }
                Token::Semicolon => {
                    return Err(ParseError::UnexpectedToken {
                        position: tok.pos,
                        message: "unexpected ';' in selector".into(),
                    });
                }
                _ => {
                    if tok.token == Token::Chunk {
                        paren_depth += paren_delta(&tok.text);
                    }
                    self.advance();
                    current.push(tok);
                }
            }
        }

        if !current.is_empty() {
            selectors.push(minify_selector(&current));
        }
        if selectors.is_empty() {
            return Err(ParseError::UnexpectedToken {
                position: self.cursor,
                message: "expected selector before '{'".into(),
            });
        }

        let declarations = self.consume_block_body()?;
        Ok(Rule::Style(StyleRule {
            selectors,
            declarations,
        }))
    }

    /// `@keyword prelude;` or `@keyword prelude { ... }`. `@media` bodies are
    /// parsed recursively so scoping can reach the rules inside; every other
    /// block at-rule keeps its body as opaque minified text.
    fn parse_at_rule(&mut self) -> Result<Rule, ParseError> {
        let at = match self.advance() {
            Some(tok) => tok,
            None => return Err(ParseError::UnexpectedEof("expected at-keyword".into())),
        };
        let is_media = at.text == "@media";
        let mut prelude_tokens = vec![at];

        loop {
            let Some(tok) = self.peek().cloned() else {
                // Statement at-rule missing its ';' at end of input.
                return Ok(Rule::Other(OtherRule {
                    prelude: minify_declarations(&prelude_tokens),
                    body: None,
                }));
            };
            match tok.token {
                Token::Semicolon => {
                    self.advance();
                    return Ok(Rule::Other(OtherRule {
                        prelude: minify_declarations(&prelude_tokens),
                        body: None,
                    }));
                }
                Token::BraceOpen => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                    prelude_tokens.push(tok);
                }
            }
        }

        let prelude = minify_declarations(&prelude_tokens);
        if is_media {
            let rules = self.parse_rules(true)?;
            Ok(Rule::Media(MediaRule { prelude, rules }))
        } else {
            let body = self.consume_block_body()?;
            Ok(Rule::Other(OtherRule {
                prelude,
                body: Some(body),
            }))
        }
    }

    /// Consume tokens up to the matching `}` (already inside the block) and
    /// rebuild them minified. Nested braces are kept balanced.
    fn consume_block_body(&mut self) -> Result<String, ParseError> {
        let mut depth = 0usize;
        let mut body = Vec::new();
        loop {
            let Some(tok) = self.advance() else {
                return Err(ParseError::UnexpectedEof("expected '}'".into()));
            };
            match tok.token {
                Token::BraceOpen => {
                    depth += 1;
                    body.push(tok);
                }
                Token::BraceClose if depth == 0 => break,
                Token::BraceClose => {
                    depth -= 1;
                    body.push(tok);
                }
                _ => body.push(tok),
            }
        }
        Ok(minify_declarations(&body))
    }
}

/// Net paren nesting contributed by a chunk, so selector lists split on
/// commas only outside `:is(a, b)`-style groups.
fn paren_delta(text: &str) -> i32 {
    let mut delta = 0;
    for b in text.bytes() {
        match b {
            b'(' => delta += 1,
            b')' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Rebuild a selector from its tokens. Spaces survive only where the source
/// had one and it carries meaning: descendant combinators and the gap before
/// a detached `:pseudo`. Spaces around `>`, `+`, `~` are dropped.
fn minify_selector(tokens: &[PToken]) -> String {
    rebuild(tokens, |prev, tok| {
        if is_combinator(prev) || is_combinator(tok) {
            return false;
        }
        !matches!(prev.token, Token::Colon | Token::Comma) && tok.token != Token::Comma
    })
}

/// Rebuild declarations (and at-rule preludes/bodies) from tokens. Spaces
/// survive only between value tokens, never around `:` `;` `,` or braces.
fn minify_declarations(tokens: &[PToken]) -> String {
    rebuild(tokens, |prev, tok| {
        !matches!(
            prev.token,
            Token::Colon | Token::Semicolon | Token::Comma | Token::BraceOpen | Token::BraceClose
        ) && !matches!(
            tok.token,
            Token::Colon | Token::Semicolon | Token::Comma | Token::BraceOpen | Token::BraceClose
        )
    })
}

fn rebuild(tokens: &[PToken], needs_space: impl Fn(&PToken, &PToken) -> bool) -> String {
    let mut out = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 {
            let prev = &tokens[i - 1];
            if !prev.adjacent_to(tok) && needs_space(prev, tok) {
                out.push(' ');
            }
        }
        out.push_str(&tok.text);
    }
    out
}

fn is_combinator(tok: &PToken) -> bool {
    tok.token == Token::Chunk && matches!(tok.text.as_str(), ">" | "+" | "~")
}
