//! Source file enumeration.
//!
//! The analyzer only sees `(name, text)` pairs; providers decide where they
//! come from.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["build", "target", "out", "node_modules"];

/// Content of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub path: PathBuf,
    /// File name used as provenance in the catalog.
    pub name: String,
    pub text: String,
}

impl SourceText {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            path,
            name,
            text: text.into(),
        }
    }
}

/// Yields the files to analyze, in a stable order.
pub trait FileProvider {
    fn files(&self) -> anyhow::Result<Vec<SourceText>>;
}

/// Walks a directory (or takes a single file) from disk.
pub struct DirectoryProvider {
    root: PathBuf,
    extensions: Vec<String>,
    excluded: GlobSet,
}

impl DirectoryProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: vec!["kt".to_string(), "kts".to_string()],
            excluded: GlobSet::empty(),
        }
    }

    /// Only files with these extensions are analyzed.
    pub fn extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Skip paths matching any of these glob patterns.
    pub fn excluded_paths(mut self, patterns: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid exclude pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        self.excluded = builder.build()?;
        Ok(self)
    }

    fn wants(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|e| e == ext) && !self.excluded.is_match(path)
    }

    fn collect_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && self.wants(entry.path()) {
                paths.push(entry.path().to_path_buf());
            }
        }

        paths.sort();
        Ok(paths)
    }
}

impl FileProvider for DirectoryProvider {
    fn files(&self) -> anyhow::Result<Vec<SourceText>> {
        let paths = self.collect_paths()?;
        debug!(root = %self.root.display(), count = paths.len(), "collected source files");

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(&path)
                .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
            match String::from_utf8(bytes) {
                Ok(text) => files.push(SourceText::new(path, text)),
                Err(_) => warn!(path = %path.display(), "skipping non UTF-8 file"),
            }
        }
        Ok(files)
    }
}

/// In-memory files, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    files: Vec<SourceText>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.push(SourceText::new(path, text));
        self
    }
}

impl FileProvider for MemoryProvider {
    fn files(&self) -> anyhow::Result<Vec<SourceText>> {
        Ok(self.files.clone())
    }
}
