//! Transform pipeline.
//!
//! A transform mutates a whole collection in place: every document, or every
//! page, of a build at once. Transforms see the full slice rather than one item
//! at a time so that a transform can use collection-wide context and so that
//! setup work happens once per stage instead of once per item.
//!
//! Transforms take `&mut [T]`, never an iterator. Lifting a document transform
//! to pages needs two passes over the same pages (one to hand out documents,
//! one to put them back), which a one-shot iterator cannot provide.

pub mod document;
pub mod page;

use std::{fmt, path::PathBuf};

use frelia_core::{Document, Page};
use thiserror::Error;
use tracing::debug;

pub use document::{CopyMetadata, RenderTemplate, SetDefaultMetadata};
pub use page::{DateFromPath, RebasePath, StripExtension};

use crate::template::TemplateError;

/// Transform errors.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Template rendering error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A page path lies outside the base it is rebased against.
    #[error("{path} is not inside {base}")]
    NotDescendant { path: PathBuf, base: PathBuf },

    /// Error raised by a custom transform.
    #[error("{0}")]
    Custom(String),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// A mutation applied to a whole collection of items.
pub trait Transform<T> {
    /// Apply the transform to every item.
    fn apply(&self, items: &mut [T]) -> Result<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<T, F> Transform<T> for F
where
    F: Fn(&mut [T]) -> Result<()>,
{
    fn apply(&self, items: &mut [T]) -> Result<()> {
        self(items)
    }
}

/// Transforms applied one after another, in the order they were added.
///
/// Each transform sees the result of every transform before it, so reordering
/// a group can change its output.
pub struct TransformGroup<T> {
    transforms: Vec<Box<dyn Transform<T>>>,
}

impl<T> TransformGroup<T> {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Append a transform.
    pub fn push(&mut self, transform: impl Transform<T> + 'static) {
        self.transforms.push(Box::new(transform));
    }

    /// Append a transform, builder style.
    #[must_use]
    pub fn with(mut self, transform: impl Transform<T> + 'static) -> Self {
        self.push(transform);
        self
    }

    /// Number of transforms in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the group has no transforms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl<T> Default for TransformGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TransformGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.transforms.iter().map(|t| t.name()))
            .finish()
    }
}

impl<T> Transform<T> for TransformGroup<T> {
    fn apply(&self, items: &mut [T]) -> Result<()> {
        for transform in &self.transforms {
            debug!(transform = transform.name(), count = items.len(), "applying transform");
            transform.apply(items)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "TransformGroup"
    }
}

/// Lifts a document transform so it runs over pages.
///
/// Documents are moved out of the pages into a list, transformed together,
/// then moved back into the page they came from. Pages get their documents
/// back even when the transform fails.
#[derive(Debug)]
pub struct LiftDocuments<D> {
    inner: D,
}

impl<D> LiftDocuments<D> {
    /// Wrap a document transform.
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: Transform<Document>> Transform<Page> for LiftDocuments<D> {
    fn apply(&self, pages: &mut [Page]) -> Result<()> {
        let mut documents: Vec<Document> = pages
            .iter_mut()
            .map(|page| std::mem::take(&mut page.document))
            .collect();

        let result = self.inner.apply(&mut documents);

        for (page, document) in pages.iter_mut().zip(documents) {
            page.document = document;
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<Page> {
        vec![
            Page::new("a", Document::from_body("1")),
            Page::new("b", Document::from_body("2")),
        ]
    }

    fn append(suffix: &'static str) -> impl Fn(&mut [Document]) -> Result<()> {
        move |documents: &mut [Document]| {
            for document in documents.iter_mut() {
                document.body.push_str(suffix);
            }
            Ok(())
        }
    }

    #[test]
    fn test_group_applies_in_order() {
        let group = TransformGroup::new().with(append("x")).with(append("y"));
        let mut documents = vec![Document::from_body("a"), Document::from_body("b")];

        group.apply(&mut documents).unwrap();

        assert_eq!(documents[0].body, "axy");
        assert_eq!(documents[1].body, "bxy");
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_group_stops_at_first_error() {
        let fail = |_: &mut [Document]| -> Result<()> {
            Err(TransformError::Custom("boom".to_string()))
        };
        let group = TransformGroup::new()
            .with(append("x"))
            .with(fail)
            .with(append("y"));
        let mut documents = vec![Document::from_body("a")];

        let err = group.apply(&mut documents).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(documents[0].body, "ax");
    }

    #[test]
    fn test_empty_group_is_noop() {
        let group: TransformGroup<Document> = TransformGroup::default();
        let mut documents = vec![Document::from_body("a")];
        group.apply(&mut documents).unwrap();
        assert_eq!(documents[0].body, "a");
        assert!(group.is_empty());
    }

    #[test]
    fn test_lift_propagates_mutations() {
        let lift = LiftDocuments::new(append("!"));
        let mut pages = pages();

        lift.apply(&mut pages).unwrap();

        assert_eq!(pages[0].document.body, "1!");
        assert_eq!(pages[1].document.body, "2!");
        assert_eq!(pages[0].path, PathBuf::from("a"));
    }

    #[test]
    fn test_lift_propagates_replacements() {
        let replace = |documents: &mut [Document]| -> Result<()> {
            for document in documents.iter_mut() {
                *document = Document::from_body(format!("new {}", document.body));
            }
            Ok(())
        };
        let mut pages = pages();

        LiftDocuments::new(replace).apply(&mut pages).unwrap();

        assert_eq!(pages[0].document.body, "new 1");
        assert_eq!(pages[1].document.body, "new 2");
    }

    #[test]
    fn test_lift_sees_whole_collection() {
        let count_all = |documents: &mut [Document]| -> Result<()> {
            let total = documents.len().to_string();
            for document in documents.iter_mut() {
                document.set("total", total.clone());
            }
            Ok(())
        };
        let mut pages = pages();

        LiftDocuments::new(count_all).apply(&mut pages).unwrap();

        assert!(pages.iter().all(|p| p.document.get_str("total") == Some("2")));
    }

    #[test]
    fn test_lift_restores_documents_on_error() {
        let fail = |documents: &mut [Document]| -> Result<()> {
            documents[0].body.push('?');
            Err(TransformError::Custom("boom".to_string()))
        };
        let mut pages = pages();

        assert!(LiftDocuments::new(fail).apply(&mut pages).is_err());
        assert_eq!(pages[0].document.body, "1?");
        assert_eq!(pages[1].document.body, "2");
    }

    #[test]
    fn test_lift_in_page_group() {
        let group = TransformGroup::new()
            .with(LiftDocuments::new(append("x")))
            .with(|pages: &mut [Page]| -> Result<()> {
                for page in pages.iter_mut() {
                    page.path = PathBuf::from(&page.document.body);
                }
                Ok(())
            });
        let mut pages = pages();

        group.apply(&mut pages).unwrap();

        assert_eq!(pages[0].path, PathBuf::from("1x"));
        assert_eq!(pages[1].path, PathBuf::from("2x"));
    }
}
