//! Pages bind documents to output paths.

use std::path::{Path, PathBuf};

use crate::document::Document;

/// A page during the transform phase: a path and the document built there.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Path the page will be written to, relative to the output directory
    /// once the pipeline has rebased it.
    pub path: PathBuf,

    /// The page's document.
    pub document: Document,
}

impl Page {
    /// Create a new page.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    /// Replace the document with its rendered text.
    #[must_use]
    pub fn into_rendered(self, text: impl Into<String>) -> RenderedPage {
        RenderedPage::new(self.path, text)
    }
}

/// A page after rendering: a path and its final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Output path, relative to the output directory.
    pub path: PathBuf,

    /// Rendered file contents.
    pub text: String,
}

impl RenderedPage {
    /// Create a new rendered page.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
