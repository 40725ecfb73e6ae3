//! Runtime renderer: a pure, depth-first, left-to-right tree evaluator.
//!
//! Walks a compiled template against props/context, substituting `{...}`
//! expressions in text, evaluating `:`-prefixed attributes, unrolling
//! `<for>`, gating `<if>`, splicing `<children/>` slot content, and
//! expanding component references against the catalog. Every evaluator
//! invocation is awaited before the walk continues, so handler side effects
//! land in document order and later expressions observe them.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::compile::Catalog;
use crate::markup::{Attributes, Element, Node};

use super::evaluator::{Evaluator, HandlerError};
use super::scope::Scope;

/// Component expansion depth limit. A self-referential component without a
/// terminating condition hits this instead of exhausting the stack.
const MAX_DEPTH: usize = 64;

/// Errors from rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("<for> subject must evaluate to an array, got {found}: {subject}")]
    ForRequiresArray {
        subject: String,
        found: &'static str,
    },
    #[error("component expansion exceeded depth {limit} (self-referential component?)")]
    DepthExceeded { limit: usize },
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Render a compiled template into a concrete node tree.
///
/// Pure except for whatever the evaluator's handlers do; safe to call
/// concurrently over the same catalog.
pub async fn render<E: Evaluator>(
    template: &[Node],
    catalog: &Catalog,
    props: Map<String, Value>,
    context: Value,
    evaluator: &E,
) -> Result<Vec<Node>, RenderError> {
    let ctx = RenderCtx { catalog, evaluator };
    let scope = Scope::new(props, context);
    render_nodes(&ctx, template, &scope, &[], 0).await
}

struct RenderCtx<'a, E> {
    catalog: &'a Catalog,
    evaluator: &'a E,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Recursive walk. Boxed because async recursion needs an erased future
/// type; `slot` carries the caller's pre-rendered children for
/// `<children/>`, `depth` counts component expansions only.
fn render_nodes<'a, E: Evaluator>(
    ctx: &'a RenderCtx<'a, E>,
    nodes: &'a [Node],
    scope: &'a Scope,
    slot: &'a [Node],
    depth: usize,
) -> BoxFuture<'a, Result<Vec<Node>, RenderError>> {
    Box::pin(async move {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                Node::Text(text) => {
                    let rendered = render_text(ctx, &text.text, scope).await?;
                    out.push(Node::text(rendered));
                }
                Node::Element(el) => render_element(ctx, el, scope, slot, depth, &mut out).await?,
            }
        }
        Ok(out)
    })
}

async fn render_element<'a, E: Evaluator>(
    ctx: &'a RenderCtx<'a, E>,
    el: &'a Element,
    scope: &'a Scope,
    slot: &'a [Node],
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<(), RenderError> {
    match el.tag.as_str() {
        // `<for subject=":expr" key="name">`: children once per element,
        // concatenated without a wrapper.
        "for" => {
            let subject = el.attr("subject").unwrap_or_default();
            let value = eval_attr(ctx, subject, scope).await?;
            let Value::Array(items) = value else {
                return Err(RenderError::ForRequiresArray {
                    subject: subject.to_string(),
                    found: value_kind(&value),
                });
            };
            let key = el.attr("key").unwrap_or("item");
            for item in items {
                let child_scope = scope.with_binding(key, item);
                let rendered = render_nodes(ctx, &el.children, &child_scope, slot, depth).await?;
                out.extend(rendered);
            }
        }

        // `<if check=":expr">`: children or nothing at all.
        "if" => {
            let check = el.attr("check").unwrap_or_default();
            let value = eval_attr(ctx, check, scope).await?;
            if truthy(&value) {
                let rendered = render_nodes(ctx, &el.children, scope, slot, depth).await?;
                out.extend(rendered);
            }
        }

        // `<children/>`: the caller's slot content, already rendered in the
        // caller's scope. Placeable any number of times.
        "children" => out.extend(slot.iter().cloned()),

        _ => match ctx.catalog.get(&el.tag) {
            Some(component) => {
                if depth >= MAX_DEPTH {
                    return Err(RenderError::DepthExceeded { limit: MAX_DEPTH });
                }

                // Calling attributes evaluate in the caller's scope and
                // become the candidate props.
                let mut props = Map::new();
                for (name, raw) in &el.attributes {
                    props.insert(name.clone(), eval_attr(ctx, raw, scope).await?);
                }

                // Slot content pre-renders in the caller's scope, before the
                // component's own props exist.
                let slot_content = render_nodes(ctx, &el.children, scope, slot, depth).await?;

                // A `get` handler replaces the props with its return value.
                let props = match component.server_js.get("get") {
                    Some(script) => {
                        let bindings = scope.handler_bindings(props);
                        let result = ctx.evaluator.run_script(script, &bindings).await?;
                        match result {
                            Value::Object(map) => map,
                            _ => Map::new(),
                        }
                    }
                    None => props,
                };

                let component_scope = scope.enter_component(props);
                let rendered = render_nodes(
                    ctx,
                    &component.template,
                    &component_scope,
                    &slot_content,
                    depth + 1,
                )
                .await?;
                out.extend(rendered);
            }

            // Ordinary element: evaluate attributes, recurse, keep the tag.
            None => {
                let mut attributes = Attributes::new();
                for (name, raw) in &el.attributes {
                    let value = match raw.strip_prefix(':') {
                        Some(expr) => {
                            let result =
                                ctx.evaluator.evaluate(expr, &scope.bindings()).await?;
                            stringify(&result)
                        }
                        None => raw.clone(),
                    };
                    attributes.insert(name.clone(), value);
                }
                let children = render_nodes(ctx, &el.children, scope, slot, depth).await?;
                out.push(Node::Element(Element {
                    tag: el.tag.clone(),
                    attributes,
                    children,
                }));
            }
        },
    }
    Ok(())
}

/// Substitute every balanced `{...}` region in a text run.
async fn render_text<'a, E: Evaluator>(
    ctx: &'a RenderCtx<'a, E>,
    text: &str,
    scope: &Scope,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for piece in split_expressions(text) {
        match piece {
            Piece::Literal(literal) => out.push_str(literal),
            Piece::Expression(source) => {
                let value = ctx.evaluator.evaluate(source, &scope.bindings()).await?;
                out.push_str(&stringify(&value));
            }
        }
    }
    Ok(out)
}

/// A `:`-prefixed attribute value evaluates; anything else is a literal.
async fn eval_attr<'a, E: Evaluator>(
    ctx: &'a RenderCtx<'a, E>,
    raw: &str,
    scope: &Scope,
) -> Result<Value, RenderError> {
    match raw.strip_prefix(':') {
        Some(expr) => Ok(ctx.evaluator.evaluate(expr, &scope.bindings()).await?),
        None => Ok(Value::String(raw.to_string())),
    }
}

enum Piece<'a> {
    Literal(&'a str),
    Expression(&'a str),
}

/// Split text into literal runs and balanced `{...}` expression sources
/// (braces stripped). Nested braces stay inside one expression; an
/// unbalanced `{` is literal.
fn split_expressions(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        match balanced_end(&rest[start..]) {
            Some(len) => {
                if start > 0 {
                    pieces.push(Piece::Literal(&rest[..start]));
                }
                pieces.push(Piece::Expression(&rest[start + 1..start + len - 1]));
                rest = &rest[start + len..];
            }
            None => break,
        }
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    pieces
}

/// Byte length of the balanced `{...}` region starting at the head of `s`,
/// or `None` if the braces never balance.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in s.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// How an expression result splices into text: nothing for null, strings
/// verbatim, everything else in JSON notation.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Truthiness for `<if check>`: null, false, zero, and the empty string are
/// falsy; arrays and objects are always truthy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
