//! Expression scope: what a `{...}` region can see at a given tree position.

use serde_json::{Map, Value};

use super::evaluator::Bindings;

/// The bindings visible to expression evaluation at one tree position:
/// the props map, the request `context`, and ordered loop-introduced locals.
///
/// Scopes only ever grow downward — entering a `<for>` adds a local,
/// entering a component replaces props and drops locals — and derivation
/// always builds a new value, so nothing leaks back up the tree.
#[derive(Debug, Clone)]
pub struct Scope {
    props: Map<String, Value>,
    context: Value,
    locals: Vec<(String, Value)>,
}

impl Scope {
    pub fn new(props: Map<String, Value>, context: Value) -> Self {
        Self {
            props,
            context,
            locals: Vec::new(),
        }
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// Child scope with one extra local binding (a loop variable). A
    /// rebound name shadows: the later binding wins at lookup.
    pub fn with_binding(&self, name: &str, value: Value) -> Scope {
        let mut child = self.clone();
        child.locals.push((name.to_string(), value));
        child
    }

    /// Scope for a component's own template: new props, same context,
    /// caller locals dropped.
    pub fn enter_component(&self, props: Map<String, Value>) -> Scope {
        Scope {
            props,
            context: self.context.clone(),
            locals: Vec::new(),
        }
    }

    /// The full binding list for expression evaluation: `props`, `context`,
    /// then locals in introduction order.
    pub fn bindings(&self) -> Bindings {
        let mut bindings = vec![
            ("props".to_string(), Value::Object(self.props.clone())),
            ("context".to_string(), self.context.clone()),
        ];
        bindings.extend(self.locals.iter().cloned());
        bindings
    }

    /// The binding list for a component's `get` handler: the evaluated
    /// calling attributes as `props`, plus the current `context`.
    pub fn handler_bindings(&self, props: Map<String, Value>) -> Bindings {
        vec![
            ("props".to_string(), Value::Object(props)),
            ("context".to_string(), self.context.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn bindings_start_with_props_and_context() {
        let scope = Scope::new(props(&[("a", json!(1))]), json!({"user": "jo"}));
        let bindings = scope.bindings();
        assert_eq!(bindings[0].0, "props");
        assert_eq!(bindings[0].1, json!({"a": 1}));
        assert_eq!(bindings[1].0, "context");
        assert_eq!(bindings[1].1, json!({"user": "jo"}));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn with_binding_appends_local() {
        let scope = Scope::new(Map::new(), Value::Null);
        let child = scope.with_binding("item", json!(3));
        assert_eq!(child.bindings().last().unwrap(), &("item".to_string(), json!(3)));
        // Parent unchanged.
        assert_eq!(scope.bindings().len(), 2);
    }

    #[test]
    fn nested_bindings_keep_order() {
        let scope = Scope::new(Map::new(), Value::Null)
            .with_binding("outer", json!(1))
            .with_binding("inner", json!(2));
        let bindings = scope.bindings();
        let names: Vec<&str> = bindings.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["props", "context", "outer", "inner"]);
    }

    #[test]
    fn enter_component_resets_locals_and_props() {
        let scope = Scope::new(props(&[("a", json!(1))]), json!("ctx"))
            .with_binding("item", json!(9));
        let inner = scope.enter_component(props(&[("b", json!(2))]));
        let bindings = inner.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].1, json!({"b": 2}));
        assert_eq!(bindings[1].1, json!("ctx"));
    }
}
