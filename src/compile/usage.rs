//! Component usage analysis: which catalog entries does a tree reach?

use crate::compile::model::Catalog;
use crate::markup::Node;

/// Collect the component keys transitively used by `tree`, deduplicated,
/// in first-occurrence order.
///
/// On the first encounter of a key the component's own template is walked
/// too (nested components count as used), and the calling element's children
/// are always walked (components passed as slot content count as used). The
/// first-encounter gate doubles as the cycle guard for self-referential
/// components.
pub fn get_used(tree: &[Node], catalog: &Catalog) -> Vec<String> {
    let mut used = Vec::new();
    walk(tree, catalog, &mut used);
    used
}

fn walk(nodes: &[Node], catalog: &Catalog, used: &mut Vec<String>) {
    for node in nodes {
        let Some(el) = node.as_element() else {
            continue;
        };
        if let Some(component) = catalog.get(&el.tag) {
            if !used.iter().any(|key| key == &el.tag) {
                used.push(el.tag.clone());
                walk(&component.template, catalog, used);
            }
        }
        walk(&el.children, catalog, used);
    }
}
