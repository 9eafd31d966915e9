//! Page loading.
//!
//! Walks a directory tree and decodes every regular file into a page.

use std::{
    fs,
    path::{Path, PathBuf},
};

use frelia_core::{CoreError, DocumentCodec, Page};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Page loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Directory traversal error.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be decoded into a document.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CoreError,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Loads pages from a directory using a document codec.
///
/// Each page's path is the file path as found by the walk: the root joined
/// with the file's path below it. Rebase pages before writing them.
#[derive(Debug, Clone, Default)]
pub struct PageLoader<C> {
    codec: C,
    sorted: bool,
}

impl<C: DocumentCodec> PageLoader<C> {
    /// Create a loader decoding files with `codec`.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            sorted: false,
        }
    }

    /// Visit directory entries in file name order.
    ///
    /// Without this the order is whatever the file system returns.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    /// Lazily load every file under `root`.
    ///
    /// The walk happens as the iterator is consumed; loading again walks the
    /// file system again.
    pub fn load(&self, root: impl AsRef<Path>) -> Pages<'_, C> {
        let mut walk = WalkDir::new(root);
        if self.sorted {
            walk = walk.sort_by_file_name();
        }
        Pages {
            loader: self,
            walker: walk.into_iter(),
        }
    }

    /// Load every file under `root`, stopping at the first failure.
    pub fn load_all(&self, root: impl AsRef<Path>) -> Result<Vec<Page>> {
        let root = root.as_ref();
        info!(dir = %root.display(), "loading pages");
        let pages = self.load(root).collect::<Result<Vec<_>>>()?;
        info!(count = pages.len(), "pages loaded");
        Ok(pages)
    }

    /// Load a single page from a file.
    pub fn load_page(&self, path: &Path) -> Result<Page> {
        debug!(path = %path.display(), "loading page");

        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = self
            .codec
            .decode(&text)
            .map_err(|source| LoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Page::new(path, document))
    }
}

/// Iterator over pages loaded from a directory tree.
#[derive(Debug)]
pub struct Pages<'a, C> {
    loader: &'a PageLoader<C>,
    walker: walkdir::IntoIter,
}

impl<C: DocumentCodec> Iterator for Pages<'_, C> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if entry.file_type().is_dir() {
                continue;
            }
            // Symlinks count when they point at a regular file.
            if entry.path().is_file() {
                return Some(self.loader.load_page(entry.path()));
            }
        }
    }
}
