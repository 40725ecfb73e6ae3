//! Per-file compiler: one TPE source into a template tree, per-verb server
//! scripts, client script, compiled CSS, and directives.
//!
//! A TPE file is ordinary markup whose top-level elements are given meaning
//! by tag:
//!
//! - exactly one `<template>` — the base tree;
//! - `<script area="server" method="...">` — one server script per verb;
//! - `<script area="client">` — concatenated client script, with optional
//!   `src=`, `bundle`/`babel` (routed through the transform collaborator)
//!   and `no-hash` (wrapped in the no-hash sentinels) markers;
//! - `<style>` — concatenated and compiled once by the CSS engine;
//! - `<title>`, `<description>`, `<lang>` — at most one each, text-only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::css;
use crate::markup::{is_html_tag, Element, Node};

use super::model::Component;
use super::sources::AssetReader;

/// Errors from compiling a single TPE file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("expected exactly one <template> element, found {count}")]
    NoTemplate { count: usize },
    #[error("duplicate <{tag}> directive")]
    DuplicateDirective { tag: String },
    #[error("<{tag}> must contain exactly one text node")]
    InvalidDirective { tag: String },
    #[error("failed to read asset {path}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid stylesheet: {0}")]
    Css(#[from] css::ParseError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Failure from the script transform collaborator. Always fatal for the
/// file being compiled.
#[derive(Debug, thiserror::Error)]
#[error("script transform failed: {message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transpiles/bundles client scripts explicitly marked `bundle` or `babel`.
pub trait ScriptTransform {
    fn transform(&self, source: &str) -> Result<String, TransformError>;
}

/// Pass-through transform for setups without a bundler toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl ScriptTransform for IdentityTransform {
    fn transform(&self, source: &str) -> Result<String, TransformError> {
        Ok(source.to_string())
    }
}

/// The compiled form of one TPE source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TpeFile {
    pub xml_template: Vec<Node>,
    pub server_js: BTreeMap<String, String>,
    pub client_js: String,
    pub css: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
}

impl TpeFile {
    /// Reshape into a catalog entry.
    pub fn into_component(self) -> Component {
        Component {
            template: self.xml_template,
            server_js: self.server_js,
            client_js: self.client_js,
            css: self.css,
            title: self.title,
            description: self.description,
            language: self.language,
        }
    }
}

/// Compile one TPE source. `dir` anchors relative `src=` asset paths.
pub fn parse_tpe_file(
    text: &str,
    dir: &Path,
    assets: &impl AssetReader,
    transform: &impl ScriptTransform,
) -> Result<TpeFile, FileError> {
    let roots = crate::markup::parse(text);
    let elements: Vec<&Element> = roots.iter().filter_map(Node::as_element).collect();

    let templates: Vec<&Element> = elements
        .iter()
        .copied()
        .filter(|el| el.tag == "template")
        .collect();
    if templates.len() != 1 {
        return Err(FileError::NoTemplate {
            count: templates.len(),
        });
    }
    let mut template = templates[0].children.clone();

    let mut server_js = BTreeMap::new();
    let mut client_parts = Vec::new();
    for el in elements.iter().filter(|el| el.tag == "script") {
        match el.attr("area") {
            Some("server") => {
                let method = el
                    .attr("method")
                    .filter(|m| !m.is_empty())
                    .unwrap_or("get")
                    .to_string();
                // Duplicate methods overwrite, last wins.
                server_js.insert(method, script_source(el, dir, assets)?);
            }
            Some("client") => {
                let mut body = script_source(el, dir, assets)?;
                if el.attr("bundle").is_some() || el.attr("babel").is_some() {
                    body = transform.transform(&body)?;
                }
                if el.attr("no-hash").is_some() {
                    body = css::no_hash(&body);
                }
                client_parts.push(body);
            }
            _ => {}
        }
    }
    let client_js = client_parts.join("\n");

    let mut style_parts = Vec::new();
    for el in elements.iter().filter(|el| el.tag == "style") {
        let mut body = script_source(el, dir, assets)?;
        if el.attr("no-hash").is_some() {
            body = css::no_hash(&body);
        }
        style_parts.push(body);
    }
    let style_source = style_parts.join("\n");
    let css_out = css::compile_css((!style_source.is_empty()).then_some(style_source.as_str()))?;

    let title = directive(&elements, "title")?;
    let description = directive(&elements, "description")?;
    let language = directive(&elements, "lang")?;

    if let Some(hash) = &css_out.hash {
        stamp_specifier(&mut template, hash);
    }

    Ok(TpeFile {
        xml_template: template,
        server_js,
        client_js,
        css: css_out.css.unwrap_or_default(),
        title,
        description,
        language,
    })
}

/// A script/style element's source: the `src=` asset if given, otherwise the
/// element's raw text body.
fn script_source(
    el: &Element,
    dir: &Path,
    assets: &impl AssetReader,
) -> Result<String, FileError> {
    if let Some(src) = el.attr("src").filter(|s| !s.is_empty()) {
        let path = dir.join(src);
        return assets
            .read(&path)
            .map_err(|source| FileError::Asset { path, source });
    }
    Ok(el.only_text_child().unwrap_or_default().to_string())
}

/// At most one `<tag>` with a single text child.
fn directive(elements: &[&Element], tag: &str) -> Result<Option<String>, FileError> {
    let matches: Vec<&Element> = elements.iter().copied().filter(|el| el.tag == tag).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [el] => match el.only_text_child() {
            Some(text) => Ok(Some(text.to_string())),
            None => Err(FileError::InvalidDirective {
                tag: tag.to_string(),
            }),
        },
        _ => Err(FileError::DuplicateDirective {
            tag: tag.to_string(),
        }),
    }
}

/// Stamp the style specifier on every recognized HTML element, recursively.
/// Component references are skipped: they get their own specifier when
/// compiled independently.
fn stamp_specifier(nodes: &mut [Node], hash: &str) {
    for node in nodes {
        if let Node::Element(el) = node {
            if is_html_tag(&el.tag) {
                el.attributes
                    .insert(css::SPECIFIER_ATTR.to_string(), hash.to_string());
            }
            stamp_specifier(&mut el.children, hash);
        }
    }
}
