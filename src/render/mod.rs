//! Runtime rendering: evaluator boundary, expression scope, tree evaluator.

pub mod evaluator;
pub mod renderer;
pub mod scope;

pub use evaluator::{Bindings, Evaluator, HandlerError};
pub use renderer::{render, RenderError};
pub use scope::Scope;
