//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use frelia_core::Config;
use frelia_generator::Builder;

/// Run the build command.
///
/// Loads the configuration (with environment overrides) and builds the site.
/// `output` replaces the configured output directory when given.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    if let Some(output) = output {
        config.build.output_dir = output.to_path_buf();
    }

    tracing::debug!(?config, "Loaded configuration");

    let output_dir = config.build.output_dir.clone();
    let stats = Builder::new(config).build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:        {}", stats.pages);
    println!("  Static files: {}", stats.static_files);
    println!();
    println!("  Duration:     {:.2}s", duration.as_secs_f64());
    println!("  Output:       {}", output_dir.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_build_with_output_override() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content/blog")).unwrap();
        fs::write(root.join("content/blog/post"), "title: Post\n---\nfiris").unwrap();

        let config_path = root.join("frelia.toml");
        fs::write(
            &config_path,
            format!(
                "[site]\ntitle = \"Atelier\"\nbase_url = \"https://example.com\"\n\n\
                 [build]\ncontent_dir = {:?}\ntemplate_dir = {:?}\n",
                root.join("content").display().to_string(),
                root.join("templates").display().to_string(),
            ),
        )
        .unwrap();

        let out = root.join("dist");
        run(&config_path, Some(&out)).unwrap();

        assert!(fs::read_to_string(out.join("blog/post")).unwrap().contains("firis"));
        assert!(out.join("sitemap.xml").exists());
    }

    #[test]
    fn test_build_missing_config() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir.path().join("missing.toml"), None).is_err());
    }
}
