//! Static file linking.
//!
//! Mirrors a directory of static files into the output directory using hard
//! links, copying where a link cannot be made (for example across devices).

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Static file errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Directory traversal error.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// IO error.
    #[error("failed to link {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Link every file under `src` to the same relative path under `dst`.
///
/// Returns the number of files linked. A missing `src` links nothing.
pub fn link_recursively(src: &Path, dst: &Path) -> Result<usize> {
    info!(
        source = %src.display(),
        dest = %dst.display(),
        "linking static files"
    );

    if !src.exists() {
        debug!("source directory does not exist, skipping");
        return Ok(0);
    }

    let mut count = 0;
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path
            .strip_prefix(src)
            .map_err(|_| AssetError::InvalidPath(path.to_path_buf()))?;
        link_file(path, &dst.join(relative))?;
        count += 1;
    }

    info!(count, "static files linked");
    Ok(count)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AssetError {
    let path = path.to_path_buf();
    move |source| AssetError::Io { path, source }
}

/// Link a single file, replacing whatever is at `dest`.
fn link_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    if dest.exists() {
        fs::remove_file(dest).map_err(io_error(dest))?;
    }

    if let Err(e) = fs::hard_link(source, dest) {
        debug!(src = %source.display(), error = %e, "hard link failed, copying");
        fs::copy(source, dest).map_err(io_error(source))?;
    }

    debug!(
        src = %source.display(),
        dest = %dest.display(),
        "linked static file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_link_recursively() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        let dst = dir.path().join("public");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("css/style.css"), "body {}").unwrap();
        fs::write(src.join("robots.txt"), "User-agent: *").unwrap();

        let count = link_recursively(&src, &dst).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(dst.join("css/style.css")).unwrap(),
            "body {}"
        );
        assert_eq!(
            fs::read_to_string(dst.join("robots.txt")).unwrap(),
            "User-agent: *"
        );
    }

    #[test]
    fn test_link_skips_hidden() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        let dst = dir.path().join("public");
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join(".git/config"), "x").unwrap();
        fs::write(src.join(".DS_Store"), "x").unwrap();
        fs::write(src.join("favicon.ico"), "icon").unwrap();

        assert_eq!(link_recursively(&src, &dst).unwrap(), 1);
        assert!(!dst.join(".git").exists());
        assert!(!dst.join(".DS_Store").exists());
    }

    #[test]
    fn test_link_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        let dst = dir.path().join("public");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.txt"), "new").unwrap();
        fs::write(dst.join("a.txt"), "old").unwrap();

        link_recursively(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_link_missing_source() {
        let dir = TempDir::new().unwrap();
        let count = link_recursively(&dir.path().join("nope"), &dir.path().join("out")).unwrap();
        assert_eq!(count, 0);
    }
}
