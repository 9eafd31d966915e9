//! Atom feed generation.
//!
//! Builds an RFC 4287 feed of dated pages, newest first.

use atom_syndication::{Category, Entry, Feed, FixedDateTime, Link, Person, Text};
use chrono::{DateTime, NaiveDate, NaiveTime};
use frelia_core::{Config, Page, document::value_to_text};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::sitemap::page_url;

/// Feed generation errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Atom serialization error.
    #[error("atom error: {0}")]
    Atom(#[from] atom_syndication::Error),

    /// Serialized feed is not valid UTF-8.
    #[error("feed is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

const TITLE_KEY: &str = "title";
const SUMMARY_KEY: &str = "summary";
const TAGS_KEY: &str = "tags";
const UPDATED_KEY: &str = "updated";

/// Atom feed generator.
#[derive(Debug)]
pub struct FeedGenerator<'a> {
    config: &'a Config,
}

impl<'a> FeedGenerator<'a> {
    /// Create a new feed generator.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Pages carrying the date field, newest first, up to the feed limit.
    fn dated_pages<'p>(&self, pages: &'p [Page]) -> Vec<(&'p Page, NaiveDate)> {
        let date_field = &self.config.metadata.date_field;
        let mut dated: Vec<_> = pages
            .iter()
            .filter_map(|page| page.document.date(date_field).map(|date| (page, date)))
            .collect();
        dated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.path.cmp(&b.0.path)));
        dated.truncate(self.config.feed.limit);
        dated
    }

    /// Build the feed for `pages`.
    ///
    /// The feed's `updated` is the newest entry's, or the newest date among
    /// all pages when no entry is kept, or the Unix epoch. The same pages
    /// always give the same feed.
    #[must_use]
    pub fn feed(&self, pages: &[Page]) -> Feed {
        let site = &self.config.site;
        let entries: Vec<Entry> = self
            .dated_pages(pages)
            .into_iter()
            .map(|(page, published)| self.entry(page, published))
            .collect();

        let updated = entries
            .iter()
            .map(|e| *e.updated())
            .max()
            .or_else(|| self.latest_date(pages).map(midnight_utc))
            .unwrap_or_else(|| DateTime::UNIX_EPOCH.fixed_offset());

        let mut feed = Feed::default();
        feed.set_id(self.config.url_for(""));
        feed.set_title(site.title.as_str());
        feed.set_updated(updated);
        feed.set_rights(site.rights.as_deref().map(Text::plain));
        feed.set_links(vec![
            Link {
                href: self.config.url_for(&self.config.feed.path.to_string_lossy()),
                rel: "self".to_string(),
                mime_type: Some("application/atom+xml".to_string()),
                hreflang: None,
                title: None,
                length: None,
            },
            Link {
                href: self.config.url_for(""),
                rel: "alternate".to_string(),
                mime_type: Some("text/html".to_string()),
                hreflang: None,
                title: None,
                length: None,
            },
        ]);
        if let Some(author) = &site.author {
            feed.set_authors(vec![Person {
                name: author.clone(),
                email: None,
                uri: Some(self.config.url_for("")),
                ..Default::default()
            }]);
        }

        info!(entries = entries.len(), "feed built");
        feed.set_entries(entries);
        feed
    }

    /// Render the feed for `pages` as XML.
    pub fn generate(&self, pages: &[Page]) -> Result<String> {
        let feed = self.feed(pages);
        let bytes = feed.write_to(Vec::new())?;
        Ok(String::from_utf8(bytes)?)
    }

    fn latest_date(&self, pages: &[Page]) -> Option<NaiveDate> {
        let date_field = &self.config.metadata.date_field;
        pages
            .iter()
            .filter_map(|page| {
                let document = &page.document;
                document.date(UPDATED_KEY).or_else(|| document.date(date_field))
            })
            .max()
    }

    fn entry(&self, page: &Page, published: NaiveDate) -> Entry {
        let document = &page.document;
        let url = page_url(self.config, &page.path);
        debug!(%url, "feed entry");

        let title = document
            .get(TITLE_KEY)
            .map(value_to_text)
            .unwrap_or_else(|| page.path.display().to_string());
        let updated = document.date(UPDATED_KEY).unwrap_or(published);

        let mut entry = Entry::default();
        entry.set_id(url.as_str());
        entry.set_title(title);
        entry.set_published(Some(midnight_utc(published)));
        entry.set_updated(midnight_utc(updated));
        entry.set_links(vec![Link {
            href: url,
            rel: "alternate".to_string(),
            mime_type: Some("text/html".to_string()),
            hreflang: None,
            title: None,
            length: None,
        }]);

        if let Some(summary) = document.get(SUMMARY_KEY) {
            entry.set_summary(Some(Text::plain(value_to_text(summary))));
        }

        entry.set_categories(categories(document.get(TAGS_KEY)));
        entry
    }
}

fn midnight_utc(date: NaiveDate) -> FixedDateTime {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn categories(tags: Option<&Value>) -> Vec<Category> {
    let terms: Vec<String> = match tags {
        Some(Value::Sequence(seq)) => seq.iter().map(value_to_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_to_text(other)],
    };
    terms
        .into_iter()
        .map(|term| Category {
            term,
            scheme: None,
            label: None,
        })
        .collect()
}
