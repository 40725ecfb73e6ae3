//! # tpe
//!
//! A single-file template engine. One `.tpe` source co-locates a markup
//! template, scoped style blocks, per-verb server scripts, and client
//! scripts; the compiler turns a directory of them into one serializable
//! app model, and the renderer evaluates that model into HTML per request —
//! expressions, loops, conditionals, and recursive component expansion,
//! with no client-side virtual DOM.
//!
//! ## Core Systems
//!
//! - **[`markup`]** — Context-sensitive tokenizer, tree builder, node model,
//!   HTML serialization with trusted-passthrough and Outlook macros
//! - **[`css`]** — Scoping/minification engine: logos tokenizer, rule
//!   parser, content-hash specifier rewriting, no-hash regions
//! - **[`compile`]** — Per-file compiler, component usage analysis, and the
//!   app compiler with its usage-ratio bundling decision
//! - **[`render`]** — Async tree evaluator over the compiled model, behind a
//!   narrow expression-evaluator trait
//! - **[`testing`]** — Stub evaluator and render helpers for tests
//!
//! ## Pipeline
//!
//! ```text
//! .tpe sources ── compile::Compiler ──> CompiledApp (JSON-round-trippable)
//!                                           │
//!               props + context ── render::render ──> Node tree ── to_xml
//! ```
//!
//! The engine is parameterized by its collaborators: an
//! [`Evaluator`](render::Evaluator) for the host expression language, an
//! [`AssetReader`](compile::AssetReader) for `src=` assets, and a
//! [`ScriptTransform`](compile::ScriptTransform) for bundled client
//! scripts. HTTP serving, routing, and file watching live outside.

pub mod compile;
pub mod css;
pub mod markup;
pub mod render;
pub mod testing;

pub use compile::{CompileOptions, CompiledApp, Compiler, SourceFile};
pub use markup::{parse, to_xml, Node};
pub use render::{render, Evaluator, HandlerError, RenderError};
