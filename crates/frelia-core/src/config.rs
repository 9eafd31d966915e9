//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    document::Metadata,
    error::{CoreError, Result},
};

/// Main configuration structure for frelia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Metadata defaulting and derivation.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Sitemap settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Atom feed settings.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,

    /// Rights statement for the feed.
    #[serde(default)]
    pub rights: Option<String>,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding source documents.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Output directory for the generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding page templates.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Directory of files linked into the output unchanged.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Template used when a document does not name one.
    #[serde(default = "default_template")]
    pub default_template: String,

    /// Match `.html` case-insensitively when building pretty URLs.
    #[serde(default)]
    pub strip_extension_ignore_case: bool,
}

/// Metadata transforms applied to every document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Values used for fields a document leaves unset.
    #[serde(default)]
    pub defaults: Metadata,

    /// Fields copied into missing fields, applied in order.
    #[serde(default)]
    pub copy: Vec<CopyRule>,

    /// Field that receives the date parsed from the page path.
    #[serde(default = "default_date_field")]
    pub date_field: String,
}

/// Copy one metadata field into another when the target is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Source field.
    pub from: String,

    /// Target field.
    pub to: String,
}

/// Sitemap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Whether the sitemap is generated.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output path relative to the output directory.
    #[serde(default = "default_sitemap_path")]
    pub path: PathBuf,

    /// Change frequency applied to every URL.
    #[serde(default)]
    pub changefreq: Option<String>,

    /// Priority applied to every URL.
    #[serde(default)]
    pub priority: Option<f64>,
}

/// Atom feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Whether the feed is generated.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output path relative to the output directory.
    #[serde(default = "default_feed_path")]
    pub path: PathBuf,

    /// Maximum number of entries in the feed.
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

// Default value functions
fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_template() -> String {
    "base.html".to_string()
}

fn default_date_field() -> String {
    "published".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sitemap_path() -> PathBuf {
    PathBuf::from("sitemap.xml")
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("atom.xml")
}

fn default_feed_limit() -> usize {
    20
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            template_dir: default_template_dir(),
            static_dir: None,
            default_template: default_template(),
            strip_extension_ignore_case: false,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            defaults: Metadata::new(),
            copy: Vec::new(),
            date_field: default_date_field(),
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_sitemap_path(),
            changefreq: None,
            priority: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_feed_path(),
            limit: default_feed_limit(),
        }
    }
}

impl Config {
    /// Create a configuration with default sections.
    #[must_use]
    pub fn new(title: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                base_url: base_url.into(),
                author: None,
                rights: None,
            },
            build: BuildConfig::default(),
            metadata: MetadataConfig::default(),
            sitemap: SitemapConfig::default(),
            feed: FeedConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FRELIA__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FRELIA").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.metadata.date_field.is_empty() {
            return Err(CoreError::config("metadata.date_field cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Get the full URL for a path.
    ///
    /// Backslashes from Windows paths are normalized to URL separators.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.replace('\\', "/");
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
