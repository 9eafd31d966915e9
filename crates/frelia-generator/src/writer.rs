//! Page writing.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use frelia_core::RenderedPage;
use thiserror::Error;
use tracing::{debug, info};

/// Page writing errors.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO error.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page path is absolute and would escape the target directory.
    #[error("page path must be relative: {0}")]
    AbsolutePath(PathBuf),

    /// Page path climbs out of the target directory.
    #[error("page path escapes the target directory: {0}")]
    EscapesTarget(PathBuf),
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Writes rendered pages below a target directory.
///
/// Existing files are overwritten. Writes are not transactional: a failure
/// part way leaves the pages written so far on disk.
#[derive(Debug, Clone)]
pub struct PageWriter {
    target_dir: PathBuf,
}

impl PageWriter {
    /// Create a writer for `target_dir`.
    #[must_use]
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// The directory pages are written below.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Write every page, returning how many were written.
    pub fn write(&self, pages: &[RenderedPage]) -> Result<usize> {
        info!(
            count = pages.len(),
            dir = %self.target_dir.display(),
            "writing pages"
        );
        for page in pages {
            self.write_page(page)?;
        }
        Ok(pages.len())
    }

    /// Write one page, creating missing parent directories.
    pub fn write_page(&self, page: &RenderedPage) -> Result<PathBuf> {
        if page.path.is_absolute() {
            return Err(WriteError::AbsolutePath(page.path.clone()));
        }
        if page.path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        }) {
            return Err(WriteError::EscapesTarget(page.path.clone()));
        }

        let output_path = self.target_dir.join(&page.path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&output_path, &page.text).map_err(|source| WriteError::Io {
            path: output_path.clone(),
            source,
        })?;

        debug!(path = %output_path.display(), "wrote page");
        Ok(output_path)
    }
}
