//! The expression evaluator boundary.
//!
//! The core never interprets expression source text itself. Everything
//! between `{}` in text, every `:`-prefixed attribute, and every server
//! handler body goes through this trait, sandboxed to exactly the supplied
//! bindings — no ambient scope. Both methods return futures so an evaluator
//! backed by a subprocess or a sandboxed VM can suspend the render; the
//! renderer awaits them strictly in document order.

use std::future::Future;

use serde_json::Value;

/// Named values visible to one evaluation: `props`, `context`, and any
/// loop-introduced names, in binding order.
pub type Bindings = Vec<(String, Value)>;

/// An error escaping a handler or expression. Propagated to the render
/// caller unchanged; the core never suppresses it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("handler failed: {message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluates expressions and server script bodies for the renderer.
pub trait Evaluator {
    /// Evaluate a single expression (the inside of a `{...}` region or a
    /// `:`-prefixed attribute) against exactly `bindings`.
    fn evaluate(
        &self,
        source: &str,
        bindings: &[(String, Value)],
    ) -> impl Future<Output = Result<Value, HandlerError>>;

    /// Run a server script body (a per-verb handler) against exactly
    /// `bindings` and return its result value.
    fn run_script(
        &self,
        source: &str,
        bindings: &[(String, Value)],
    ) -> impl Future<Output = Result<Value, HandlerError>>;
}
