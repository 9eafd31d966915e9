//! Sitemap generation.
//!
//! Generates XML sitemaps following <http://www.sitemaps.org/protocol.html>.
//! Entries are validated when they are built, before any XML is written.

use std::{fmt, io::Write, path::Path, str::FromStr};

use chrono::NaiveDate;
use frelia_core::{Config, Page, path::INDEX_FILE};
use thiserror::Error;
use tracing::debug;

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry field has a value the protocol does not allow.
    #[error("invalid sitemap entry: {0}")]
    Validation(String),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// The protocol's spelling of the frequency.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl FromStr for ChangeFreq {
    type Err = SitemapError;

    /// Parse a frequency. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            other => Err(SitemapError::Validation(format!(
                "changefreq must be one of always, hourly, daily, weekly, monthly, yearly or never, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    loc: String,
    lastmod: Option<NaiveDate>,
    changefreq: Option<ChangeFreq>,
    priority: Option<f64>,
}

impl SitemapUrl {
    /// Create a validated entry.
    ///
    /// Fails when `changefreq` is not one of the protocol's values or
    /// `priority` lies outside `0.0..=1.0`.
    pub fn new(
        loc: impl Into<String>,
        lastmod: Option<NaiveDate>,
        changefreq: Option<&str>,
        priority: Option<f64>,
    ) -> Result<Self> {
        let changefreq = changefreq.map(str::parse::<ChangeFreq>).transpose()?;
        if let Some(priority) = priority {
            if !(0.0..=1.0).contains(&priority) {
                return Err(SitemapError::Validation(format!(
                    "priority must be between 0.0 and 1.0, got {priority}"
                )));
            }
        }

        Ok(Self {
            loc: loc.into(),
            lastmod,
            changefreq,
            priority,
        })
    }

    /// URL location.
    #[must_use]
    pub fn loc(&self) -> &str {
        &self.loc
    }

    /// Last modification date.
    #[must_use]
    pub fn lastmod(&self) -> Option<NaiveDate> {
        self.lastmod
    }

    /// Change frequency.
    #[must_use]
    pub fn changefreq(&self) -> Option<ChangeFreq> {
        self.changefreq
    }

    /// Priority.
    #[must_use]
    pub fn priority(&self) -> Option<f64> {
        self.priority
    }

    /// Convert the entry to XML.
    fn to_xml(&self) -> String {
        let mut xml = String::from("  <url>\n");

        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&self.loc)));

        if let Some(lastmod) = &self.lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.format("%Y-%m-%d")
            ));
        }

        if let Some(changefreq) = &self.changefreq {
            xml.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
        }

        if let Some(priority) = self.priority {
            xml.push_str(&format!(
                "    <priority>{}</priority>\n",
                format_priority(priority)
            ));
        }

        xml.push_str("  </url>\n");
        xml
    }
}

const URLSET_OPEN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="http://www.sitemaps.org/schemas/sitemap/0.9
                            http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd">
"#;

const URLSET_CLOSE: &str = "</urlset>";

/// Render a sitemap document for `urls`.
#[must_use]
pub fn render_sitemap(urls: &[SitemapUrl]) -> String {
    let mut xml = String::from(URLSET_OPEN);
    for url in urls {
        xml.push_str(&url.to_xml());
    }
    xml.push_str(URLSET_CLOSE);
    xml
}

/// Write a sitemap document for `urls` to a writer.
pub fn write_sitemap<W: Write>(urls: &[SitemapUrl], writer: &mut W) -> Result<()> {
    writer.write_all(render_sitemap(urls).as_bytes())?;
    Ok(())
}

/// Public URL of a page, dropping a trailing `index.html`.
#[must_use]
pub fn page_url(config: &Config, path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let path = if path == INDEX_FILE {
        ""
    } else {
        path.strip_suffix(INDEX_FILE)
            .filter(|p| p.ends_with('/'))
            .unwrap_or(path.as_str())
    };
    config.url_for(path)
}

/// Builds sitemap entries for site pages.
#[derive(Debug)]
pub struct SitemapGenerator<'a> {
    config: &'a Config,
}

impl<'a> SitemapGenerator<'a> {
    /// Create a new sitemap generator.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build one entry per page.
    ///
    /// `lastmod` comes from the page's `updated` field, falling back to the
    /// configured date field. Frequency and priority come from the sitemap
    /// configuration and are validated here.
    pub fn urls(&self, pages: &[Page]) -> Result<Vec<SitemapUrl>> {
        let sitemap = &self.config.sitemap;
        let date_field = &self.config.metadata.date_field;

        pages
            .iter()
            .map(|page| {
                let lastmod = page
                    .document
                    .date("updated")
                    .or_else(|| page.document.date(date_field));
                let loc = page_url(self.config, &page.path);
                debug!(%loc, "sitemap entry");
                SitemapUrl::new(loc, lastmod, sitemap.changefreq.as_deref(), sitemap.priority)
            })
            .collect()
    }

    /// Render the sitemap for `pages`.
    pub fn generate(&self, pages: &[Page]) -> Result<String> {
        let urls = self.urls(pages)?;
        Ok(render_sitemap(&urls))
    }
}

/// Format a priority with at least one decimal place.
fn format_priority(priority: f64) -> String {
    if priority.fract() == 0.0 {
        format!("{priority:.1}")
    } else {
        priority.to_string()
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
