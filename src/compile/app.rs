//! App compiler: all page and component sources into one [`CompiledApp`].
//!
//! Per-file parse failures are logged and the file skipped; the build keeps
//! going with what parsed. Cross-file failures (unresolved component
//! references, missing page title/description) are checked after every file
//! has parsed and abort the build.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::markup::Node;

use super::model::{
    component_key, page_url, Catalog, CompileOptions, CompiledApp, Page,
};
use super::sources::{AssetReader, FsReader, SourceFile};
use super::tpe_file::{parse_tpe_file, IdentityTransform, ScriptTransform, TpeFile};
use super::usage::get_used;

/// Pages without an explicit `get` handler fall back to echoing the query;
/// the HTTP runner supplies the `query` binding.
const DEFAULT_GET_HANDLER: &str = "return query";

/// Built-in standard components, merged under user components.
const STD_COMPONENTS: &[(&str, &str)] = &[
    (
        "std.spacer",
        "<template><div height=\":props.size\" \
         style=\"line-height:1px;font-size:1px\"> </div></template>",
    ),
    (
        "std.center",
        "<template><div style=\"margin:0 auto;text-align:center\">\
         <children/></div></template>",
    ),
];

/// Cross-file errors. Unlike per-file parse failures these are fatal: the
/// app as a whole is inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{referenced_by} references unknown component <{key}>")]
    MissingComponent { key: String, referenced_by: String },
    #[error("page {url} is missing a <title>")]
    MissingTitle { url: String },
    #[error("page {url} is missing a <description>")]
    MissingDescription { url: String },
}

/// The app compiler, parameterized by its external collaborators: the asset
/// reader behind `src=` attributes and the script transform behind
/// `bundle`/`babel` markers.
#[derive(Debug, Clone, Default)]
pub struct Compiler<R = FsReader, T = IdentityTransform> {
    options: CompileOptions,
    assets: R,
    transform: T,
}

impl Compiler {
    /// A compiler with filesystem assets and no script transform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: AssetReader, T: ScriptTransform> Compiler<R, T> {
    /// A compiler with explicit collaborators.
    pub fn with_collaborators(options: CompileOptions, assets: R, transform: T) -> Self {
        Self {
            options,
            assets,
            transform,
        }
    }

    /// Replace the options (builder).
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile one TPE source. `dir` anchors relative `src=` asset paths.
    pub fn parse_file(
        &self,
        text: &str,
        dir: &Path,
    ) -> Result<TpeFile, super::tpe_file::FileError> {
        parse_tpe_file(text, dir, &self.assets, &self.transform)
    }

    /// Compile every page and component source into one app.
    pub fn compile_app(
        &self,
        pages: &[SourceFile],
        components: &[SourceFile],
    ) -> Result<CompiledApp, AppError> {
        let catalog = self.build_catalog(components);

        // Parse pages, skipping failures.
        let mut drafts: Vec<(String, TpeFile)> = Vec::new();
        for source in pages {
            let dir = source.path.parent().unwrap_or_else(|| Path::new(""));
            match self.parse_file(&source.text, dir) {
                Ok(file) => drafts.push((page_url(&source.path), file)),
                Err(error) => {
                    warn!(path = %source.path.display(), %error, "skipping page: parse failed");
                }
            }
        }
        debug!(
            pages = drafts.len(),
            components = catalog.len(),
            "sources parsed"
        );

        // Cross-file consistency: every dotted tag reachable from a page or
        // a component template must resolve in the catalog.
        for (url, file) in &drafts {
            validate_references(&file.xml_template, &catalog, url)?;
        }
        for (key, component) in catalog.iter() {
            validate_references(&component.template, &catalog, key)?;
        }

        // Usage analysis needs the complete catalog.
        let usage: Vec<Vec<String>> = drafts
            .iter()
            .map(|(_, file)| get_used(&file.xml_template, &catalog))
            .collect();
        let total_pages = drafts.len().max(1);
        let mut pages_using: HashMap<&str, usize> = HashMap::new();
        for used in &usage {
            for key in used {
                *pages_using.entry(key.as_str()).or_default() += 1;
            }
        }

        // Assemble pages; decide bundle-vs-inline per used component.
        let mut css_bundle = String::new();
        let mut js_bundle = String::new();
        let mut bundled: HashSet<&str> = HashSet::new();
        let mut out_pages = Vec::with_capacity(drafts.len());

        for ((url, file), used) in drafts.iter().zip(&usage) {
            let title = file
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::MissingTitle { url: url.clone() })?;
            let description = file
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .ok_or_else(|| AppError::MissingDescription { url: url.clone() })?;

            let mut server_js = file.server_js.clone();
            server_js
                .entry("get".to_string())
                .or_insert_with(|| DEFAULT_GET_HANDLER.to_string());
            if server_js.keys().any(|method| method != "get") {
                warn!(
                    url = %url,
                    "page defines non-GET handlers; redirect and cookie handling \
                     happen in the HTTP runner"
                );
            }

            let mut css = file.css.clone();
            let mut client_js = file.client_js.clone();

            for key in used {
                let ratio = pages_using[key.as_str()] as f64 / total_pages as f64;
                let component = catalog
                    .get(key)
                    .expect("usage analysis only returns catalog keys");
                if ratio > self.options.bundle_threshold {
                    // Shared: emitted once, first-discovery order.
                    if bundled.insert(key.as_str()) {
                        css_bundle.push_str(&component.css);
                        append_script(&mut js_bundle, &component.client_js);
                    }
                } else {
                    // Inlined onto every using page.
                    css.push_str(&component.css);
                    append_script(&mut client_js, &component.client_js);
                }
            }

            out_pages.push(Page {
                url: url.clone(),
                title,
                description,
                template: file.xml_template.clone(),
                server_js,
                client_js,
                css,
                language: file.language.clone(),
                components: used.clone(),
            });
        }

        debug!(
            bundled = bundled.len(),
            css_bundle_bytes = css_bundle.len(),
            js_bundle_bytes = js_bundle.len(),
            "app compiled"
        );
        Ok(CompiledApp {
            pages: out_pages,
            components: catalog,
            css_bundle,
            js_bundle,
        })
    }

    /// Compile component sources over the built-in standard components.
    /// User components win on key clash; files that fail to parse are
    /// logged and skipped.
    fn build_catalog(&self, components: &[SourceFile]) -> Catalog {
        let mut user = Catalog::new();
        for source in components {
            let dir = source.path.parent().unwrap_or_else(|| Path::new(""));
            match self.parse_file(&source.text, dir) {
                Ok(file) => user.insert(component_key(&source.path), file.into_component()),
                Err(error) => {
                    warn!(path = %source.path.display(), %error, "skipping component: parse failed");
                }
            }
        }
        self.standard_components().merge(user)
    }

    fn standard_components(&self) -> Catalog {
        let mut catalog = Catalog::new();
        for (key, source) in STD_COMPONENTS {
            let file = self
                .parse_file(source, Path::new(""))
                .expect("built-in component must parse");
            catalog.insert(*key, file.into_component());
        }
        catalog
    }
}

/// Append a script fragment, newline-separated.
fn append_script(target: &mut String, script: &str) {
    if script.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(script);
}

/// Reject dotted tags that resolve to nothing: those are component
/// references, and an unresolvable one would render as a broken element.
fn validate_references(nodes: &[Node], catalog: &Catalog, context: &str) -> Result<(), AppError> {
    for node in nodes {
        let Some(el) = node.as_element() else {
            continue;
        };
        if el.tag.contains('.') && !catalog.contains(&el.tag) {
            return Err(AppError::MissingComponent {
                key: el.tag.clone(),
                referenced_by: context.to_string(),
            });
        }
        validate_references(&el.children, catalog, context)?;
    }
    Ok(())
}
