//! CSS AST: the rule list the scoper rewrites.
//!
//! Declarations stay opaque minified text: scoping only ever touches
//! selectors, so parsing property/value structure would be wasted work.

/// One top-level (or `@media`-nested) CSS item.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Style(StyleRule),
    Media(MediaRule),
    Other(OtherRule),
}

/// An ordinary style rule: `selector, selector { declarations }`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Comma-separated selectors, individually minified and trimmed.
    pub selectors: Vec<String>,
    /// The declaration block, minified, without surrounding braces.
    pub declarations: String,
}

/// An `@media` rule. Scoping recurses into its body; the prelude is left
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRule {
    /// Full prelude including the at-keyword, e.g. `@media (max-width:600px)`.
    pub prelude: String,
    pub rules: Vec<Rule>,
}

/// Any other at-rule (`@import`, `@font-face`, `@keyframes`, ...), carried
/// through verbatim (minified) and never scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherRule {
    /// Full prelude including the at-keyword.
    pub prelude: String,
    /// Block body without braces, or `None` for statement at-rules
    /// terminated by `;`.
    pub body: Option<String>,
}

impl Rule {
    /// Serialize this rule, minified, into `out`.
    pub fn write(&self, out: &mut String) {
        match self {
            Rule::Style(rule) => {
                out.push_str(&rule.selectors.join(","));
                out.push('{');
                out.push_str(&rule.declarations);
                out.push('}');
            }
            Rule::Media(rule) => {
                out.push_str(&rule.prelude);
                out.push('{');
                for inner in &rule.rules {
                    inner.write(out);
                }
                out.push('}');
            }
            Rule::Other(rule) => {
                out.push_str(&rule.prelude);
                match &rule.body {
                    Some(body) => {
                        out.push('{');
                        out.push_str(body);
                        out.push('}');
                    }
                    None => out.push(';'),
                }
            }
        }
    }
}

/// Serialize a rule list, minified.
pub fn write_rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        rule.write(&mut out);
    }
    out
}
