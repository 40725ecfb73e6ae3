//! Compilation pipeline: per-file compiler, usage analysis, app assembly.

pub mod app;
pub mod model;
pub mod sources;
pub mod tpe_file;
pub mod usage;

pub use app::{AppError, Compiler};
pub use model::{
    component_key, page_url, Catalog, CompileOptions, CompiledApp, Component, Page,
};
pub use sources::{sources_from_dir, AssetReader, FsReader, SourceFile};
pub use tpe_file::{
    parse_tpe_file, FileError, IdentityTransform, ScriptTransform, TpeFile, TransformError,
};
pub use usage::get_used;
