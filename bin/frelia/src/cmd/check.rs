//! Check command - validate configuration and content

use std::{fs, path::Path};

use color_eyre::eyre::{Result, bail};
use frelia_core::{Config, DocumentCodec, Enja};
use frelia_generator::{SitemapUrl, TemplateRegistry};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, then decodes every content file without
/// writing anything. Unlike a build, every failure is reported rather than
/// stopping at the first.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Configuration error: {e}");
        }
    };
    check_config_values(&config, &mut result);

    println!("\nChecking templates...");
    check_templates(&config, &mut result);

    let content_dir = &config.build.content_dir;
    if content_dir.exists() {
        println!("\nChecking content files...");
        validate_content_files(content_dir, &mut result);
    } else {
        result.add_warning(format!(
            "Content directory does not exist: {}",
            content_dir.display()
        ));
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check configuration values the loader does not reject outright.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if config.site.base_url.ends_with('/') {
        result.add_warning("site.base_url should not have a trailing slash");
    }

    if config.sitemap.enabled {
        let sitemap = &config.sitemap;
        if let Err(e) = SitemapUrl::new(
            config.url_for(""),
            None,
            sitemap.changefreq.as_deref(),
            sitemap.priority,
        ) {
            result.add_error(format!("sitemap: {e}"));
        }
    }

    if config.feed.enabled && config.feed.limit == 0 {
        result.add_warning("feed.limit is 0, the feed will have no entries");
    }

    if let Some(static_dir) = &config.build.static_dir {
        if !static_dir.is_dir() {
            result.add_warning(format!(
                "Static directory does not exist: {}",
                static_dir.display()
            ));
        }
    }
}

/// Check that templates load and the default template exists.
fn check_templates(config: &Config, result: &mut ValidationResult) {
    let mut registry = TemplateRegistry::new();
    match registry.load_dir(&config.build.template_dir) {
        Ok(count) => println!("  ✓ {count} template(s) loaded"),
        Err(e) => {
            result.add_error(format!("Template error: {e}"));
            return;
        }
    }

    if registry.get(&config.build.default_template).is_none() {
        result.add_error(format!(
            "Default template not found: {}",
            config.build.default_template
        ));
    }
}

/// Decode every file under `dir`, recording each failure.
fn validate_content_files(dir: &Path, result: &mut ValidationResult) {
    let mut checked = 0;
    let mut failed = 0;

    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                result.add_error(format!("Failed to walk content: {e}"));
                failed += 1;
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        checked += 1;

        let outcome = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| Enja.decode(&text).map_err(|e| e.to_string()));
        if let Err(e) = outcome {
            failed += 1;
            result.add_error(format!("{}: {e}", path.display()));
            println!("  ✗ {}", path.display());
        }
    }

    println!("  ✓ {checked} file(s) checked, {failed} failed");
}
