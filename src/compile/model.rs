//! Compiled app model: components, pages, catalog, the durable artifact.

use std::collections::BTreeMap;
use std::path::{Component as PathComponent, Path};

use serde::{Deserialize, Serialize};

use crate::markup::Node;

/// A reusable compiled component: template plus its co-located scripts,
/// style output, and directives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub template: Vec<Node>,
    /// HTTP-verb keyed server scripts (`get`, `post`, ...).
    #[serde(default)]
    pub server_js: BTreeMap<String, String>,
    #[serde(default)]
    pub client_js: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A compiled page: component-shaped, plus the required title/description,
/// the derived URL, and the assets inlined onto it by the bundling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub description: String,
    pub template: Vec<Node>,
    pub server_js: BTreeMap<String, String>,
    #[serde(default)]
    pub client_js: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Transitively used component keys, discovery order.
    #[serde(default)]
    pub components: Vec<String>,
}

/// Immutable component catalog, keyed by namespaced component key. Built
/// once by the app compiler and shared read-only with the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, Component>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Component> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, component: Component) {
        self.0.insert(key.into(), component);
    }

    /// Lay `other` over this catalog; entries in `other` win on key clash.
    pub fn merge(mut self, other: Catalog) -> Catalog {
        self.0.extend(other.0);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Component)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Component)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Component)>>(iter: I) -> Self {
        Catalog(iter.into_iter().collect())
    }
}

/// The durable compiled artifact: everything the runtime needs, plain
/// strings/maps/arrays, lossless through JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledApp {
    pub pages: Vec<Page>,
    pub components: Catalog,
    #[serde(default)]
    pub css_bundle: String,
    #[serde(default)]
    pub js_bundle: String,
}

impl CompiledApp {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// A component used by more than this fraction of pages is promoted to
    /// the shared bundles; at or below it, its assets inline per page.
    pub bundle_threshold: f64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            bundle_threshold: 0.8,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bundling threshold (builder).
    pub fn with_bundle_threshold(mut self, threshold: f64) -> Self {
        self.bundle_threshold = threshold;
        self
    }
}

/// Namespaced component key derived from a source path relative to the
/// component root: separators become `.`, the extension drops.
/// `widgets/button.tpe` -> `widgets.button`.
pub fn component_key(path: &Path) -> String {
    let stem = path.with_extension("");
    stem.components()
        .filter_map(|part| match part {
            PathComponent::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Page URL derived from a source path relative to the page root: extension
/// stripped, a trailing `index` segment stripped, leading slash normalized.
/// `[name]` dynamic segments pass through verbatim for the server's matcher.
pub fn page_url(path: &Path) -> String {
    let stem = path.with_extension("");
    let mut parts: Vec<&str> = stem
        .components()
        .filter_map(|part| match part {
            PathComponent::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect();
    if parts.last() == Some(&"index") {
        parts.pop();
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_key_from_nested_path() {
        assert_eq!(component_key(Path::new("widgets/button.tpe")), "widgets.button");
        assert_eq!(component_key(Path::new("card.tpe")), "card");
        assert_eq!(
            component_key(Path::new("./forms/inputs/text.tpe")),
            "forms.inputs.text"
        );
    }

    #[test]
    fn page_url_basic() {
        assert_eq!(page_url(Path::new("about.tpe")), "/about");
        assert_eq!(page_url(Path::new("blog/post.tpe")), "/blog/post");
    }

    #[test]
    fn page_url_strips_index() {
        assert_eq!(page_url(Path::new("index.tpe")), "/");
        assert_eq!(page_url(Path::new("blog/index.tpe")), "/blog");
    }

    #[test]
    fn page_url_keeps_dynamic_segments() {
        assert_eq!(page_url(Path::new("blog/[slug].tpe")), "/blog/[slug]");
        assert_eq!(page_url(Path::new("[user]/index.tpe")), "/[user]");
    }

    #[test]
    fn catalog_merge_prefers_other() {
        let mut base = Catalog::new();
        base.insert("a", Component::default());
        let mut over = Catalog::new();
        let custom = Component {
            client_js: "x".into(),
            ..Component::default()
        };
        over.insert("a", custom.clone());
        over.insert("b", Component::default());

        let merged = base.merge(over);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("a"), Some(&custom));
    }

    #[test]
    fn compiled_app_round_trips_json() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "widgets.card",
            Component {
                template: vec![Node::element("div")],
                ..Component::default()
            },
        );
        let app = CompiledApp {
            pages: vec![Page {
                url: "/".into(),
                title: "Home".into(),
                description: "The home page".into(),
                template: vec![Node::text("hi")],
                server_js: [("get".to_string(), "return query".to_string())]
                    .into_iter()
                    .collect(),
                client_js: String::new(),
                css: String::new(),
                language: None,
                components: vec!["widgets.card".into()],
            }],
            components: catalog,
            css_bundle: ".x{color:red}".into(),
            js_bundle: String::new(),
        };

        let json = app.to_json().unwrap();
        let back = CompiledApp::from_json(&json).unwrap();
        assert_eq!(back, app);
    }
}
