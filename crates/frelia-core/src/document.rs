//! Documents: a metadata mapping plus an opaque body.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_yaml::Value;

/// Document metadata keyed by field name.
///
/// Ordered so that encoding a document is reproducible; equality does not
/// depend on the order fields were inserted in.
pub type Metadata = BTreeMap<String, Value>;

/// Date format used for date values stored in metadata.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A document with structured metadata and a text body.
///
/// The framework never looks inside the body; transforms and renderers decide
/// what it means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Metadata fields. Empty rather than absent when a document has none.
    pub metadata: Metadata,

    /// Body text.
    pub body: String,
}

impl Document {
    /// Create a new document.
    #[must_use]
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Create a document with no metadata.
    #[must_use]
    pub fn from_body(body: impl Into<String>) -> Self {
        Self::new(Metadata::new(), body)
    }

    /// Get a metadata field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Get a metadata field as a string, if it is one.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Set a metadata field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.metadata.insert(key.into(), value.into())
    }

    /// Read a metadata field as a calendar date.
    ///
    /// Accepts `YYYY-MM-DD` as well as a full timestamp whose first ten
    /// characters are a date, which is how YAML headers spell dates.
    #[must_use]
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.get_str(key)?;
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
    }

    /// Store a calendar date in a metadata field.
    pub fn set_date(&mut self, key: impl Into<String>, date: NaiveDate) {
        self.set(key, date.format(DATE_FORMAT).to_string());
    }
}

/// Render a metadata value as display text.
///
/// Strings are returned as-is, sequences are joined with `", "` and null is
/// the empty string. Mappings fall back to their YAML flow form.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => value_to_text(&tagged.value),
    }
}
