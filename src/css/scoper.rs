//! CSS scoping: content hashing, no-hash regions, specifier rewriting.
//!
//! The compiled stylesheet of a TPE file is scoped to that file by a content
//! hash: every top-level selector gets an `[data-specifier="<hash>"]`
//! attribute suffix, and the same hash is stamped as a `data-specifier`
//! attribute on the file's template elements. The equality of those two
//! values is what makes the scoping collision-free.

use crate::css::model::{write_rules, Rule};
use crate::css::parser::{parse_css, ParseError};

/// Attribute name carrying the style specifier on markup elements, and the
/// attribute selector suffix on scoped CSS rules.
pub const SPECIFIER_ATTR: &str = "data-specifier";

/// Opens a no-hash region. Comment-shaped so a marked region stays legal
/// CSS and legal JS; the same pair marks `no-hash` client scripts.
pub const NO_HASH_OPEN: &str = "/*<no-hash>*/";

/// Closes a no-hash region.
pub const NO_HASH_CLOSE: &str = "/*</no-hash>*/";

/// Wrap text in the no-hash sentinel pair.
pub fn no_hash(text: &str) -> String {
    format!("{NO_HASH_OPEN}{text}{NO_HASH_CLOSE}")
}

/// Result of compiling a stylesheet: minified CSS and the content hash of
/// its hashable subset. When `hash` is defined it equals the value stamped
/// as [`SPECIFIER_ATTR`] on the owning template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssOutput {
    pub css: Option<String>,
    pub hash: Option<String>,
}

/// Compile a stylesheet: split off no-hash regions, hash the remainder,
/// scope every top-level selector with the specifier, minify, and append the
/// (unscoped, unhashed) no-hash output last.
pub fn compile_css(source: Option<&str>) -> Result<CssOutput, ParseError> {
    let Some(source) = source else {
        return Ok(CssOutput::default());
    };
    if source.trim().is_empty() {
        return Ok(CssOutput::default());
    }

    let (hashable, unhashed) = split_no_hash(source);
    let unhashed_css = write_rules(&parse_css(&unhashed)?);

    if hashable.trim().is_empty() {
        let css = (!unhashed_css.is_empty()).then_some(unhashed_css);
        return Ok(CssOutput { css, hash: None });
    }

    let hash = content_hash(&hashable);
    let mut rules = parse_css(&hashable)?;
    scope_rules(&mut rules, &hash);

    let mut css = write_rules(&rules);
    css.push_str(&unhashed_css);
    Ok(CssOutput {
        css: Some(css),
        hash: Some(hash),
    })
}

/// Split source into (hashable, no-hash) parts along the sentinel pairs.
/// Multiple pairs are supported; an unterminated open marker sends the rest
/// of the input to the no-hash side.
pub fn split_no_hash(source: &str) -> (String, String) {
    let mut hashable = String::new();
    let mut unhashed = String::new();
    let mut rest = source;

    while let Some(start) = rest.find(NO_HASH_OPEN) {
        hashable.push_str(&rest[..start]);
        let marked = &rest[start + NO_HASH_OPEN.len()..];
        match marked.find(NO_HASH_CLOSE) {
            Some(end) => {
                unhashed.push_str(&marked[..end]);
                rest = &marked[end + NO_HASH_CLOSE.len()..];
            }
            None => {
                unhashed.push_str(marked);
                return (hashable, unhashed);
            }
        }
    }
    hashable.push_str(rest);
    (hashable, unhashed)
}

/// Hex content digest of `text`. BLAKE3, truncated to 16 hex chars: stable,
/// collision-safe at realistic stylesheet counts, short enough for an
/// attribute value.
pub fn content_hash(text: &str) -> String {
    let digest = blake3::hash(text.as_bytes());
    digest.to_hex()[..16].to_string()
}

/// Append the specifier attribute selector to every selector of every style
/// rule, recursing into `@media` bodies. Other at-rules are left untouched.
fn scope_rules(rules: &mut [Rule], hash: &str) {
    for rule in rules {
        match rule {
            Rule::Style(style) => {
                for selector in &mut style.selectors {
                    selector.push_str(&format!("[{SPECIFIER_ATTR}=\"{hash}\"]"));
                }
            }
            Rule::Media(media) => scope_rules(&mut media.rules, hash),
            Rule::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_nothing() {
        assert_eq!(compile_css(None).unwrap(), CssOutput::default());
        assert_eq!(compile_css(Some("")).unwrap(), CssOutput::default());
        assert_eq!(compile_css(Some("   \n")).unwrap(), CssOutput::default());
    }

    #[test]
    fn scopes_and_minifies() {
        let out = compile_css(Some(".test { display: block; }")).unwrap();
        let hash = out.hash.expect("hash");
        assert_eq!(
            out.css.unwrap(),
            format!(".test[data-specifier=\"{hash}\"]{{display:block;}}")
        );
    }

    #[test]
    fn hash_is_digest_of_raw_source() {
        let out = compile_css(Some(".test{display:block;}")).unwrap();
        assert_eq!(out.hash.unwrap(), content_hash(".test{display:block;}"));
    }

    #[test]
    fn every_comma_selector_is_scoped() {
        let out = compile_css(Some("h1, h2 { margin: 0 }")).unwrap();
        let hash = out.hash.unwrap();
        assert_eq!(
            out.css.unwrap(),
            format!("h1[data-specifier=\"{hash}\"],h2[data-specifier=\"{hash}\"]{{margin:0}}")
        );
    }

    #[test]
    fn media_rules_scope_recursively() {
        let out =
            compile_css(Some("@media (max-width: 600px) { .a { color: red } }")).unwrap();
        let hash = out.hash.unwrap();
        assert_eq!(
            out.css.unwrap(),
            format!(
                "@media (max-width:600px){{.a[data-specifier=\"{hash}\"]{{color:red}}}}"
            )
        );
    }

    #[test]
    fn font_face_is_not_scoped() {
        let out = compile_css(Some("@font-face { font-family: X }")).unwrap();
        assert_eq!(out.css.unwrap(), "@font-face{font-family:X}");
        // A hash is still produced: the rule is hashable, just not scopeable.
        assert!(out.hash.is_some());
    }

    // ── No-hash regions ──────────────────────────────────────────────

    #[test]
    fn no_hash_region_is_excluded_from_hash_and_scoping() {
        let source = format!(".a {{ color: red }}{}", no_hash(".b { color: blue }"));
        let out = compile_css(Some(&source)).unwrap();
        let hash = out.hash.clone().unwrap();

        // Hash covers only the hashable part.
        assert_eq!(hash, content_hash(".a { color: red }"));
        // No-hash output is appended after, unscoped.
        assert_eq!(
            out.css.unwrap(),
            format!(".a[data-specifier=\"{hash}\"]{{color:red}}.b{{color:blue}}")
        );
    }

    #[test]
    fn identical_hashable_input_ignoring_no_hash_gives_identical_hash() {
        let plain = compile_css(Some(".a{x:1}")).unwrap();
        let with_extra =
            compile_css(Some(&format!(".a{{x:1}}{}", no_hash(".c{y:2}")))).unwrap();
        assert_eq!(plain.hash, with_extra.hash);
    }

    #[test]
    fn changed_hashable_input_changes_hash() {
        let a = compile_css(Some(".a{x:1}")).unwrap();
        let b = compile_css(Some(".a{x:2}")).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn only_no_hash_content_has_no_hash() {
        let out = compile_css(Some(&no_hash(".b { color: blue }"))).unwrap();
        assert!(out.hash.is_none());
        assert_eq!(out.css.unwrap(), ".b{color:blue}");
    }

    #[test]
    fn multiple_no_hash_pairs() {
        let source = format!(
            "{}.a{{x:1}}{}",
            no_hash(".n1{a:1}"),
            no_hash(".n2{b:2}")
        );
        let (hashable, unhashed) = split_no_hash(&source);
        assert_eq!(hashable, ".a{x:1}");
        assert_eq!(unhashed, ".n1{a:1}.n2{b:2}");
    }

    #[test]
    fn unterminated_no_hash_takes_rest() {
        let source = format!(".a{{x:1}}{}.b{{y:2}}", NO_HASH_OPEN);
        let (hashable, unhashed) = split_no_hash(&source);
        assert_eq!(hashable, ".a{x:1}");
        assert_eq!(unhashed, ".b{y:2}");
    }
}
