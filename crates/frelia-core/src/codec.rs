//! Document codecs.
//!
//! An Enja file is a text file that contains:
//!
//! - the document metadata formatted as YAML
//! - a line of exactly three hyphen-minus characters followed by a newline
//! - the document body, byte for byte
//!
//! The divider is not escaped anywhere: decoding always splits on the first
//! divider line, so a body line of `---` survives encoding only if no earlier
//! divider exists, which the encoder guarantees.

use serde_yaml::Value;

use crate::{
    document::{Document, Metadata},
    error::{CoreError, Result},
};

/// Line separating the metadata header from the body.
pub const DIVIDER: &str = "---\n";

/// Decode and encode documents to and from text.
pub trait DocumentCodec {
    /// Parse a document from raw text.
    fn decode(&self, text: &str) -> Result<Document>;

    /// Serialize a document to text.
    fn encode(&self, document: &Document) -> Result<String>;
}

/// The Enja format: YAML metadata, a `---` line, then the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enja;

impl DocumentCodec for Enja {
    fn decode(&self, text: &str) -> Result<Document> {
        let Some((header, body)) = split_header(text) else {
            return Ok(Document::from_body(text));
        };

        let metadata = parse_header(header)?;
        Ok(Document::new(metadata, body))
    }

    fn encode(&self, document: &Document) -> Result<String> {
        let mut text = serde_yaml::to_string(&document.metadata)?;
        text.push_str(DIVIDER);
        text.push_str(&document.body);
        Ok(text)
    }
}

/// Split text at the first divider line.
///
/// Returns `(header, body)` with the divider line itself dropped, or `None`
/// when no line is exactly the divider.
pub fn split_header(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line == DIVIDER {
            return Some((&text[..offset], &text[offset + DIVIDER.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a YAML header into metadata.
///
/// An empty header, or one that holds only comments, yields empty metadata.
fn parse_header(header: &str) -> Result<Metadata> {
    if header.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match serde_yaml::from_str::<Value>(header)? {
        Value::Null => Ok(Metadata::new()),
        value @ Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        other => Err(CoreError::malformed(format!(
            "metadata header must be a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
