//! Values derived from page paths.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Extension stripped from pretty URLs.
pub const HTML_EXTENSION: &str = "html";

/// File name that keeps its extension.
pub const INDEX_FILE: &str = "index.html";

/// Reasons a date could not be read from a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathDateError {
    /// Fewer than three directories precede the file name.
    #[error("path has fewer than three directories before the file name")]
    TooShort,

    /// A date segment is not an integer.
    #[error("path segment {0:?} is not a number")]
    NotNumeric(String),

    /// The segments are numbers but not a calendar date.
    #[error("{year}-{month}-{day} is not a valid date")]
    InvalidDate { year: u32, month: u32, day: u32 },
}

/// Parse a date from the directories leading up to a page's file name.
///
/// The three directories nearest the file name are read as year, month and
/// day, so `blog/2010/01/02/post` gives 2010-01-02.
pub fn date_from_path(path: &Path) -> Result<NaiveDate, PathDateError> {
    let segments: Vec<String> = path
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let [.., year, month, day] = segments.as_slice() else {
        return Err(PathDateError::TooShort);
    };

    let number = |segment: &String| {
        segment
            .parse::<u32>()
            .map_err(|_| PathDateError::NotNumeric(segment.clone()))
    };
    let day = number(day)?;
    let month = number(month)?;
    let year = number(year)?;

    i32::try_from(year)
        .ok()
        .filter(|&y| y > 0)
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .ok_or(PathDateError::InvalidDate { year, month, day })
}

/// Compute the pretty-URL form of a path.
///
/// Returns the path without its `.html` extension, or `None` when the path
/// should be left alone: it has another extension, or it is an index file,
/// which web servers resolve directory requests to.
#[must_use]
pub fn strip_html_extension(path: &Path, ignore_case: bool) -> Option<PathBuf> {
    let matches = |actual: &str, expected: &str| {
        if ignore_case {
            actual.eq_ignore_ascii_case(expected)
        } else {
            actual == expected
        }
    };

    let extension = path.extension()?.to_str()?;
    if !matches(extension, HTML_EXTENSION) {
        return None;
    }

    // The index exception is always exact.
    if path.file_name()? == INDEX_FILE {
        return None;
    }

    Some(path.with_extension(""))
}
