//! Source loading: `.tpe` discovery and `src=` asset reads.
//!
//! The engine itself never touches the filesystem; it consumes
//! [`SourceFile`] records and an [`AssetReader`]. The std-backed
//! implementations here are the minimal concrete collaborators that make
//! the compiler usable end-to-end.

use std::io;
use std::path::{Path, PathBuf};

/// One template source: path relative to its root, plus UTF-8 text.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Reads `src=`-referenced assets for the file compiler.
pub trait AssetReader {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Filesystem-backed asset reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl AssetReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Recursively collect every `.tpe` file under `dir`. Returned paths are
/// relative to `dir` (they become component keys and page URLs) and sorted
/// so compilation order is deterministic across platforms.
pub fn sources_from_dir(dir: &Path) -> io::Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    collect(dir, Path::new(""), &mut sources)?;
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

fn collect(root: &Path, relative: &Path, out: &mut Vec<SourceFile>) -> io::Result<()> {
    for entry in std::fs::read_dir(root.join(relative))? {
        let entry = entry?;
        let name = entry.file_name();
        let rel = relative.join(&name);
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect(root, &rel, out)?;
        } else if rel.extension().is_some_and(|ext| ext == "tpe") {
            let text = std::fs::read_to_string(entry.path())?;
            out.push(SourceFile::new(rel, text));
        }
    }
    Ok(())
}

/// In-memory asset reader for compiler tests.
#[cfg(test)]
pub(crate) struct MapReader(pub std::collections::HashMap<PathBuf, String>);

#[cfg(test)]
impl AssetReader for MapReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_reader_round_trip() {
        let reader = MapReader(
            [(PathBuf::from("x.js"), "let a = 1;".to_string())]
                .into_iter()
                .collect(),
        );
        assert_eq!(reader.read(Path::new("x.js")).unwrap(), "let a = 1;");
        assert!(reader.read(Path::new("missing.js")).is_err());
    }

    #[test]
    fn source_file_constructor() {
        let source = SourceFile::new("a/b.tpe", "<template/>");
        assert_eq!(source.path, PathBuf::from("a/b.tpe"));
        assert_eq!(source.text, "<template/>");
    }
}
