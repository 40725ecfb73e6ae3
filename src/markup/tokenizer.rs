//! Markup segmenter: character-stream scan of TPE markup into tag and text
//! segments.
//!
//! The scan is context-sensitive in three ways, which is why it is a
//! hand-rolled cursor rather than a table-driven lexer:
//!
//! - balanced `{ ... }` expression regions suspend tag recognition and
//!   whitespace collapsing, so `{<div></div>}` is literal text;
//! - outside expressions, whitespace runs collapse to a single space;
//! - `<script>` and `<style>` bodies are consumed raw, without re-tokenizing
//!   embedded `<`, `>` or quotes, until the matching close tag.
//!
//! Malformed input never errors here: stray delimiters become literal text
//! and unterminated constructs run to end of input.

use super::node::Attributes;

/// One segment of the markup stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// An opening tag, e.g. `<div class="x">` or `<br/>`.
    Open(Tag),
    /// A closing tag, e.g. `</div>`.
    Close(String),
    /// A run of text between tags, whitespace already collapsed.
    Text(String),
}

/// A parsed opening tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub self_closing: bool,
}

/// Strip markup comments (`<!-- ... -->`, including multi-line) from the
/// input. An unterminated comment consumes the rest of the input.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("<!--") {
        result.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

/// Scan markup into a flat segment stream. Comments are stripped first.
pub fn segment(input: &str) -> Vec<Segment> {
    let src = strip_comments(input);
    Scanner::new(&src).run()
}

/// Cursor-based scanner state.
struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    text: String,
    segments: Vec<Segment>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            text: String::new(),
            segments: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Segment> {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'<' => self.scan_tag(),
                b'{' => self.scan_expression(),
                c if c.is_ascii_whitespace() => self.scan_whitespace(),
                _ => self.push_char(),
            }
        }
        self.flush_text();
        self.segments
    }

    /// Flush pending text as a `Text` segment, if any.
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.segments.push(Segment::Text(text));
        }
    }

    /// Append the char at the cursor to pending text.
    fn push_char(&mut self) {
        let ch = self.src[self.pos..]
            .chars()
            .next()
            .expect("cursor stays on a char boundary before end of input");
        self.text.push(ch);
        self.pos += ch.len_utf8();
    }

    /// Collapse a whitespace run to a single space.
    fn scan_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if !self.text.ends_with(' ') {
            self.text.push(' ');
        }
    }

    /// Consume a balanced `{ ... }` expression region verbatim (nested
    /// braces allowed). An unbalanced `{` is literal text.
    fn scan_expression(&mut self) {
        let mut depth = 0usize;
        let mut end = None;
        for (offset, ch) in self.src[self.pos..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(self.pos + offset + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        match end {
            Some(end) => {
                self.text.push_str(&self.src[self.pos..end]);
                self.pos = end;
            }
            None => self.push_char(),
        }
    }

    /// Dispatch on the character after `<`: close tag, open tag, or a
    /// literal `<` in text.
    fn scan_tag(&mut self) {
        match self.bytes.get(self.pos + 1).copied() {
            Some(b'/') => {
                self.flush_text();
                self.scan_close_tag();
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.flush_text();
                self.scan_open_tag();
            }
            _ => self.push_char(),
        }
    }

    /// `</name>`: cursor is on `<`.
    fn scan_close_tag(&mut self) {
        let name_start = self.pos + 2;
        match self.src[name_start..].find('>') {
            Some(offset) => {
                let name = self.src[name_start..name_start + offset].trim().to_string();
                self.segments.push(Segment::Close(name));
                self.pos = name_start + offset + 1;
            }
            None => {
                // Unterminated close tag: discard to end of input.
                self.pos = self.bytes.len();
            }
        }
    }

    /// `<name attr="v" ...>` or `<name .../>`: cursor is on `<`.
    fn scan_open_tag(&mut self) {
        self.pos += 1;
        let name = self.scan_name();
        let mut attributes = Attributes::new();
        let mut self_closing = false;

        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            match self.bytes.get(self.pos).copied() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.bytes.get(self.pos).copied() == Some(b'>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let attr = self.scan_name();
                    if attr.is_empty() {
                        // Not a name character: skip it rather than loop.
                        self.pos += 1;
                        continue;
                    }
                    let value = self.scan_attr_value();
                    attributes.insert(attr, value);
                }
            }
        }

        let raw_body = !self_closing && (name == "script" || name == "style");
        let tag_name = name.clone();
        self.segments.push(Segment::Open(Tag {
            name,
            attributes,
            self_closing,
        }));
        if raw_body {
            self.scan_raw_body(&tag_name);
        }
    }

    /// A tag or attribute name: letters, digits, `-`, `_`, `.`, `:`.
    fn scan_name(&mut self) -> String {
        let start = self.pos;
        while let Some(&c) = self.bytes.get(self.pos) {
            if c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b'.' | b':') {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    /// Optional `= "value"` after an attribute name. A valueless attribute
    /// yields the empty string.
    fn scan_attr_value(&mut self) -> String {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.bytes.get(self.pos) != Some(&b'=') {
            return String::new();
        }
        self.pos += 1;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        match self.bytes.get(self.pos).copied() {
            Some(q @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                match self.src[start..].find(q as char) {
                    Some(offset) => {
                        self.pos = start + offset + 1;
                        self.src[start..start + offset].to_string()
                    }
                    None => {
                        // Unterminated quote: take the rest.
                        let value = self.src[start..].to_string();
                        self.pos = self.bytes.len();
                        value
                    }
                }
            }
            _ => {
                // Unquoted value, tolerated: scan until whitespace or tag end.
                let start = self.pos;
                while let Some(&c) = self.bytes.get(self.pos) {
                    if c.is_ascii_whitespace() || c == b'>' || c == b'/' {
                        break;
                    }
                    self.pos += 1;
                }
                self.src[start..self.pos].to_string()
            }
        }
    }

    /// Raw `<script>`/`<style>` body: verbatim text up to the matching close
    /// tag, emitted as one `Text` segment plus the `Close`. An unterminated
    /// body runs to end of input and is still closed.
    fn scan_raw_body(&mut self, tag: &str) {
        let close = format!("</{tag}");
        let (body_end, resume) = match self.src[self.pos..].find(&close) {
            Some(offset) => {
                let close_start = self.pos + offset;
                let after = match self.src[close_start..].find('>') {
                    Some(gt) => close_start + gt + 1,
                    None => self.bytes.len(),
                };
                (close_start, after)
            }
            None => (self.bytes.len(), self.bytes.len()),
        };
        if body_end > self.pos {
            self.segments
                .push(Segment::Text(self.src[self.pos..body_end].to_string()));
        }
        self.segments.push(Segment::Close(tag.to_string()));
        self.pos = resume;
    }
}
