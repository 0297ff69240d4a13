//! Markdown story parser for Storyloom.
//!
//! A story is one or more markdown documents made of `## Scene:` blocks with
//! typed `###` subsections. Parsing never stops at the first problem: every
//! document is segmented, linked into a [`World`], and all diagnostics are
//! returned together in a [`ParseResult`].

mod characters;
mod combinations;
/// Diagnostics and their terminal rendering.
pub mod diagnostics;
mod dialogues;
mod document;
mod draft;
mod exits;
mod frontmatter;
mod items;
mod linker;
mod outline;
mod resolver;
/// Source files and line splitting.
pub mod source;
/// Embedded value decoding.
pub mod value;

use std::path::{Path, PathBuf};

use sl_core::World;

pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use source::{SourceFile, SourceMap};

/// Result of parsing story documents into a World.
#[derive(Debug)]
pub struct ParseResult {
    /// The linked world (may be partial if errors occurred).
    pub world: World,
    /// Errors and warnings from every document.
    pub diagnostics: Vec<Diagnostic>,
    /// The documents, for rendering diagnostics.
    pub sources: SourceMap,
}

impl ParseResult {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// Render every diagnostic with source excerpts.
    pub fn render(&self) -> String {
        render_diagnostics(&self.sources, &self.diagnostics)
    }

    /// The world, or a [`LoadError`] if any diagnostic is an error.
    pub fn into_world(self) -> Result<World, LoadError> {
        if self.has_errors() {
            return Err(LoadError::Invalid {
                errors: self.error_count(),
                diagnostics: self.diagnostics,
            });
        }
        Ok(self.world)
    }
}

/// A story that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The story parsed, but with errors.
    #[error("story has {errors} error(s)")]
    Invalid {
        /// Number of error diagnostics.
        errors: usize,
        /// Every diagnostic, warnings included.
        diagnostics: Vec<Diagnostic>,
    },
}

/// Parse a single document.
pub fn parse_document(name: &str, text: &str) -> ParseResult {
    parse_documents(vec![SourceFile::new(name, text)])
}

/// Parse several documents into one world. Scenes from all documents share
/// one namespace, and combination recipes are merged.
pub fn parse_documents(files: Vec<SourceFile>) -> ParseResult {
    let mut sources = SourceMap::new();
    let mut drafts = Vec::with_capacity(files.len());
    let mut diagnostics = Vec::new();

    for file in files {
        let index = sources.add_file(file);
        if let Some(file) = sources.get_file(index) {
            tracing::debug!(file = %file.name, "parsing document");
            let (draft, mut found) = document::parse_file(index, &file.text);
            drafts.push(draft);
            diagnostics.append(&mut found);
        }
    }

    let (world, mut found) = linker::link(&drafts);
    diagnostics.append(&mut found);

    for diagnostic in diagnostics.iter().filter(|d| !d.is_error()) {
        tracing::warn!(%diagnostic, "story warning");
    }

    ParseResult {
        world,
        diagnostics,
        sources,
    }
}

/// Read and parse story files from disk.
pub fn parse_files(paths: &[impl AsRef<Path>]) -> Result<ParseResult, LoadError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        files.push(SourceFile::new(path.display().to_string(), text));
    }
    Ok(parse_documents(files))
}
