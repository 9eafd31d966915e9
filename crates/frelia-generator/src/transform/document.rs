//! Document transforms.

use frelia_core::{Document, Metadata};
use tracing::debug;

use super::{Result, Transform};
use crate::template::{TemplateContext, TemplateEngine};

/// Renders each document's body as a template.
///
/// The context is the document's own metadata laid over a set of global
/// values, so document fields win. Metadata is left unchanged.
#[derive(Debug, Clone)]
pub struct RenderTemplate<E> {
    engine: E,
    globals: Metadata,
}

impl<E: TemplateEngine> RenderTemplate<E> {
    /// Create a transform rendering bodies with `engine`.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            globals: Metadata::new(),
        }
    }

    /// Set values available to every document.
    #[must_use]
    pub fn with_globals(mut self, globals: Metadata) -> Self {
        self.globals = globals;
        self
    }
}

impl<E: TemplateEngine> Transform<Document> for RenderTemplate<E> {
    fn apply(&self, documents: &mut [Document]) -> Result<()> {
        let base = TemplateContext::from_metadata(&self.globals);
        for document in documents.iter_mut() {
            let mut context = base.clone();
            context.extend_metadata(&document.metadata);
            document.body = self.engine.render_str(&document.body, &context)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RenderTemplate"
    }
}

/// Fills in metadata fields a document leaves unset.
///
/// Fields already present always win over the defaults.
#[derive(Debug, Clone)]
pub struct SetDefaultMetadata {
    defaults: Metadata,
}

impl SetDefaultMetadata {
    /// Create a transform applying `defaults`.
    #[must_use]
    pub fn new(defaults: Metadata) -> Self {
        Self { defaults }
    }
}

impl Transform<Document> for SetDefaultMetadata {
    fn apply(&self, documents: &mut [Document]) -> Result<()> {
        for document in documents.iter_mut() {
            let mut merged = self.defaults.clone();
            merged.append(&mut document.metadata);
            document.metadata = merged;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "SetDefaultMetadata"
    }
}

/// Copies one metadata field into another that is missing.
#[derive(Debug, Clone)]
pub struct CopyMetadata {
    from: String,
    to: String,
}

impl CopyMetadata {
    /// Copy `from` into `to` wherever `to` is unset.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Transform<Document> for CopyMetadata {
    fn apply(&self, documents: &mut [Document]) -> Result<()> {
        for document in documents.iter_mut() {
            if document.metadata.contains_key(&self.to) {
                continue;
            }
            if let Some(value) = document.metadata.get(&self.from).cloned() {
                debug!(from = %self.from, to = %self.to, "copying metadata field");
                document.metadata.insert(self.to.clone(), value);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "CopyMetadata"
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;
    use crate::{
        template::{TemplateError, TemplateRegistry},
        transform::TransformError,
    };

    fn metadata(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_render_template() {
        let mut documents = vec![Document::new(
            metadata(&[("title", "Pandora")]),
            "<h1>{{ title }}</h1>",
        )];

        RenderTemplate::new(TemplateRegistry::new())
            .apply(&mut documents)
            .unwrap();

        assert_eq!(documents[0].body, "<h1>Pandora</h1>");
        assert_eq!(documents[0].metadata, metadata(&[("title", "Pandora")]));
    }

    #[test]
    fn test_render_template_globals_lose_to_document() {
        let mut site = serde_yaml::Mapping::new();
        site.insert("title".into(), "Takumi Times".into());
        let mut globals = metadata(&[("author", "Nene")]);
        globals.insert("site".into(), Value::Mapping(site));

        let mut documents = vec![
            Document::new(metadata(&[("author", "Sophie")]), "{{ author }} @ {{ site_title }}"),
            Document::from_body("{{ author }} @ {{ site_title }}"),
        ];

        RenderTemplate::new(TemplateRegistry::new())
            .with_globals(globals)
            .apply(&mut documents)
            .unwrap();

        assert_eq!(documents[0].body, "Sophie @ Takumi Times");
        assert_eq!(documents[1].body, "Nene @ Takumi Times");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let mut documents = vec![Document::from_body("{{ nothing }}")];
        let err = RenderTemplate::new(TemplateRegistry::new())
            .apply(&mut documents)
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Template(TemplateError::MissingVariable(_))
        ));
    }

    #[test]
    fn test_set_default_metadata() {
        let mut documents = vec![Document::new(metadata(&[("sophie", "prachta")]), "")];

        SetDefaultMetadata::new(metadata(&[("firis", "liane")]))
            .apply(&mut documents)
            .unwrap();

        assert_eq!(
            documents[0].metadata,
            metadata(&[("sophie", "prachta"), ("firis", "liane")])
        );
    }

    #[test]
    fn test_set_default_metadata_existing_wins() {
        let mut documents = vec![Document::new(metadata(&[("template", "post.html")]), "")];

        SetDefaultMetadata::new(metadata(&[("template", "base.html"), ("lang", "en")]))
            .apply(&mut documents)
            .unwrap();

        assert_eq!(documents[0].get_str("template"), Some("post.html"));
        assert_eq!(documents[0].get_str("lang"), Some("en"));
    }

    #[test]
    fn test_copy_metadata() {
        let mut documents = vec![
            Document::new(metadata(&[("published", "2016-01-08")]), ""),
            Document::new(
                metadata(&[("published", "2016-01-08"), ("updated", "2016-02-01")]),
                "",
            ),
            Document::default(),
        ];

        CopyMetadata::new("published", "updated")
            .apply(&mut documents)
            .unwrap();

        assert_eq!(documents[0].get_str("updated"), Some("2016-01-08"));
        assert_eq!(documents[1].get_str("updated"), Some("2016-02-01"));
        assert!(documents[2].metadata.is_empty());
    }

    #[test]
    fn test_copy_metadata_idempotent() {
        let transform = CopyMetadata::new("a", "b");
        let mut once = vec![Document::new(metadata(&[("a", "1")]), "")];
        transform.apply(&mut once).unwrap();

        let mut twice = once.clone();
        transform.apply(&mut twice).unwrap();

        assert_eq!(once, twice);
    }
}
