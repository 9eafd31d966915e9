//! New command - create a new content document

use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr, bail};
use frelia_core::{Config, Document, DocumentCodec, Enja};

/// Run the new command.
///
/// Writes an Enja document with a `title` header below the configured content
/// directory, or `content/` when there is no configuration file. Existing
/// files are never overwritten.
pub fn run(config_path: &Path, path: &Path, title: Option<&str>) -> Result<()> {
    tracing::info!(?path, ?title, "Creating new content");

    let content_dir = if config_path.exists() {
        Config::load(config_path)
            .wrap_err("Failed to load configuration")?
            .build
            .content_dir
    } else {
        PathBuf::from("content")
    };
    let file_path = content_dir.join(path);

    if file_path.exists() {
        bail!("Refusing to overwrite {}", file_path.display());
    }

    let text = Enja
        .encode(&new_document(path, title))
        .wrap_err("Failed to encode document")?;

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }
    fs::write(&file_path, text).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new content file");
    println!("Created: {}", file_path.display());

    Ok(())
}

/// A fresh document titled `title`, or after the file name.
fn new_document(path: &Path, title: Option<&str>) -> Document {
    let title = title.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .replace('-', " ")
    });

    let mut document = Document::from_body("Write your content here.\n");
    document.set("title", title);
    document
}
