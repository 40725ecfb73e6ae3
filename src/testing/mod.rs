//! Test support: a stub expression evaluator and render helpers.
//!
//! The real expression language lives behind the [`Evaluator`] boundary and
//! is supplied by the host. [`StubEvaluator`] implements just enough of one
//! — JSON literals, binding lookup, dot paths, `return` scripts — for
//! render pipelines to be exercised without a scripting runtime.

use serde_json::{Map, Value};

use crate::compile::Catalog;
use crate::markup::{to_xml, Node};
use crate::render::{render, Evaluator, HandlerError, RenderError};

/// Minimal evaluator for tests and examples.
///
/// Supported expression forms:
/// - JSON literals: `[1,2,3]`, `false`, `42`, `"text"`, `{"a":1}`
/// - binding lookup: `x`, `props`, `context`
/// - dot paths into objects: `props.user.name` (missing steps yield null)
/// - scripts with a leading `return`: `return props`
///
/// Anything else is a [`HandlerError`], which doubles as a way to test
/// error propagation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubEvaluator;

impl Evaluator for StubEvaluator {
    async fn evaluate(
        &self,
        source: &str,
        bindings: &[(String, Value)],
    ) -> Result<Value, HandlerError> {
        eval(source, bindings)
    }

    async fn run_script(
        &self,
        source: &str,
        bindings: &[(String, Value)],
    ) -> Result<Value, HandlerError> {
        eval(source, bindings)
    }
}

fn eval(source: &str, bindings: &[(String, Value)]) -> Result<Value, HandlerError> {
    let source = source.trim();
    let source = source.strip_prefix("return ").unwrap_or(source).trim();

    if let Ok(value) = serde_json::from_str(source) {
        return Ok(value);
    }

    if is_path(source) {
        let mut segments = source.split('.');
        let name = segments.next().unwrap_or_default();
        // Later bindings shadow earlier ones.
        let Some((_, mut value)) = bindings.iter().rev().find(|(n, _)| n == name).cloned()
        else {
            return Ok(Value::Null);
        };
        for segment in segments {
            value = match value {
                Value::Object(mut map) => map.remove(segment).unwrap_or(Value::Null),
                _ => Value::Null,
            };
        }
        return Ok(value);
    }

    Err(HandlerError::new(format!(
        "stub evaluator cannot evaluate: {source}"
    )))
}

fn is_path(source: &str) -> bool {
    !source.is_empty()
        && source.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

/// Coerce a JSON object literal into a props map. Panics on non-objects,
/// which is the mistake you want a test to surface immediately.
pub fn props_from(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("props must be a JSON object, got {other}"),
    }
}

/// Render a template with the stub evaluator and serialize the result.
pub async fn render_to_html(
    template: &[Node],
    catalog: &Catalog,
    props: Map<String, Value>,
    context: Value,
) -> Result<String, RenderError> {
    let nodes = render(template, catalog, props, context, &StubEvaluator).await?;
    Ok(to_xml(&nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn json_literals() {
        assert_eq!(eval("[1,2,3]", &[]).unwrap(), json!([1, 2, 3]));
        assert_eq!(eval("false", &[]).unwrap(), json!(false));
        assert_eq!(eval("42", &[]).unwrap(), json!(42));
        assert_eq!(eval("\"hi\"", &[]).unwrap(), json!("hi"));
    }

    #[test]
    fn binding_lookup() {
        let b = bindings(&[("x", json!(7))]);
        assert_eq!(eval("x", &b).unwrap(), json!(7));
    }

    #[test]
    fn later_binding_shadows() {
        let b = bindings(&[("x", json!(1)), ("x", json!(2))]);
        assert_eq!(eval("x", &b).unwrap(), json!(2));
    }

    #[test]
    fn dot_path() {
        let b = bindings(&[("props", json!({"user": {"name": "jo"}}))]);
        assert_eq!(eval("props.user.name", &b).unwrap(), json!("jo"));
    }

    #[test]
    fn missing_path_is_null() {
        let b = bindings(&[("props", json!({}))]);
        assert_eq!(eval("props.missing.deep", &b).unwrap(), Value::Null);
        assert_eq!(eval("unbound", &b).unwrap(), Value::Null);
    }

    #[test]
    fn return_prefix_is_stripped() {
        let b = bindings(&[("query", json!({"q": "x"}))]);
        assert_eq!(eval("return query", &b).unwrap(), json!({"q": "x"}));
    }

    #[test]
    fn unsupported_expression_errors() {
        assert!(eval("a + b", &[]).is_err());
    }
}
