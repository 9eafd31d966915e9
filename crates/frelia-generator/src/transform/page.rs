//! Page transforms.

use std::path::{Path, PathBuf};

use frelia_core::{Page, path};
use tracing::debug;

use super::{Result, Transform, TransformError};

/// Rebases page paths relative to a base directory.
#[derive(Debug, Clone)]
pub struct RebasePath {
    base: PathBuf,
}

impl RebasePath {
    /// Rebase against `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Transform<Page> for RebasePath {
    fn apply(&self, pages: &mut [Page]) -> Result<()> {
        // All paths are checked before any page changes.
        let rebased = pages
            .iter()
            .map(|page| {
                page.path
                    .strip_prefix(&self.base)
                    .map(Path::to_path_buf)
                    .map_err(|_| TransformError::NotDescendant {
                        path: page.path.clone(),
                        base: self.base.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        for (page, relative) in pages.iter_mut().zip(rebased) {
            page.path = relative;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RebasePath"
    }
}

/// Strips `.html` from page paths for pretty URLs, keeping `index.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripExtension {
    ignore_case: bool,
}

impl StripExtension {
    /// Match `.html` exactly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `.html` in any letter case.
    #[must_use]
    pub fn ignore_case() -> Self {
        Self { ignore_case: true }
    }
}

impl Transform<Page> for StripExtension {
    fn apply(&self, pages: &mut [Page]) -> Result<()> {
        for page in pages.iter_mut() {
            if let Some(stripped) = path::strip_html_extension(&page.path, self.ignore_case) {
                page.path = stripped;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "StripExtension"
    }
}

/// Sets a missing date field from a `.../year/month/day/slug` page path.
///
/// Pages whose paths carry no date keep the field unset.
#[derive(Debug, Clone)]
pub struct DateFromPath {
    field: String,
}

impl DateFromPath {
    /// Write parsed dates to `field`.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Transform<Page> for DateFromPath {
    fn apply(&self, pages: &mut [Page]) -> Result<()> {
        for page in pages.iter_mut() {
            if page.document.metadata.contains_key(&self.field) {
                continue;
            }
            match path::date_from_path(&page.path) {
                Ok(date) => {
                    debug!(path = %page.path.display(), %date, field = %self.field, "date from path");
                    page.document.set_date(self.field.clone(), date);
                }
                Err(e) => {
                    debug!(path = %page.path.display(), error = %e, "no date in path");
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DateFromPath"
    }
}
