//! Page rendering.
//!
//! Turns pages carrying documents into pages carrying final text.

use std::path::PathBuf;

use frelia_core::{Document, Metadata, Page, RenderedPage};
use thiserror::Error;
use tracing::{debug, info};

use crate::template::{TemplateContext, TemplateEngine, TemplateError};

/// Metadata key naming the template a document is rendered with.
pub const TEMPLATE_KEY: &str = "template";

/// Context key holding the document body.
pub const CONTENT_KEY: &str = "content";

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A page failed to render.
    #[error("failed to render {path}: {source}")]
    Page {
        path: PathBuf,
        #[source]
        source: Box<RenderError>,
    },

    /// Error raised by a custom renderer.
    #[error("{0}")]
    Custom(String),
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Turns a document into its final text.
pub trait DocumentRenderer {
    /// Render one document.
    fn render(&self, document: &Document) -> Result<String>;
}

impl<F> DocumentRenderer for F
where
    F: Fn(&Document) -> Result<String>,
{
    fn render(&self, document: &Document) -> Result<String> {
        self(document)
    }
}

/// Renders documents through a named template.
///
/// The template is taken from the document's `template` field, or the
/// default when the field is unset. The body is available as `content`.
#[derive(Debug, Clone)]
pub struct TemplateDocumentRenderer<E> {
    engine: E,
    default_template: String,
    globals: Metadata,
}

impl<E: TemplateEngine> TemplateDocumentRenderer<E> {
    /// Create a renderer falling back to `default_template`.
    #[must_use]
    pub fn new(engine: E, default_template: impl Into<String>) -> Self {
        Self {
            engine,
            default_template: default_template.into(),
            globals: Metadata::new(),
        }
    }

    /// Set values available to every template, beneath document metadata.
    #[must_use]
    pub fn with_globals(mut self, globals: Metadata) -> Self {
        self.globals = globals;
        self
    }

    fn template_for<'a>(&'a self, document: &'a Document) -> &'a str {
        document
            .get_str(TEMPLATE_KEY)
            .unwrap_or(self.default_template.as_str())
    }
}

impl<E: TemplateEngine> DocumentRenderer for TemplateDocumentRenderer<E> {
    fn render(&self, document: &Document) -> Result<String> {
        let mut context = TemplateContext::from_metadata(&self.globals);
        context.extend_metadata(&document.metadata);
        context.insert(CONTENT_KEY, document.body.as_str());

        let template = self.template_for(document);
        Ok(self.engine.render_named(template, &context)?)
    }
}

/// Maps pages to rendered pages, one to one.
#[derive(Debug, Clone)]
pub struct PageRenderer<R> {
    renderer: R,
}

impl<R: DocumentRenderer> PageRenderer<R> {
    /// Create a page renderer around a document renderer.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Render every page, keeping order and paths.
    pub fn render(&self, pages: Vec<Page>) -> Result<Vec<RenderedPage>> {
        info!(count = pages.len(), "rendering pages");
        pages
            .into_iter()
            .map(|page| self.render_page(page))
            .collect()
    }

    /// Render a single page.
    pub fn render_page(&self, page: Page) -> Result<RenderedPage> {
        debug!(path = %page.path.display(), "rendering page");
        match self.renderer.render(&page.document) {
            Ok(text) => Ok(page.into_rendered(text)),
            Err(e) => Err(RenderError::Page {
                path: page.path,
                source: Box::new(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_yaml::Value;

    use super::*;
    use crate::template::{Template, TemplateRegistry};

    fn body_renderer(document: &Document) -> Result<String> {
        Ok(document.body.clone())
    }

    #[test]
    fn test_render_preserves_paths_and_order() {
        let pages = vec![
            Page::new("blog/post", Document::from_body("firis")),
            Page::new("index.html", Document::from_body("home")),
            Page::new("about", Document::from_body("")),
        ];

        let rendered = PageRenderer::new(body_renderer).render(pages).unwrap();

        let summary: Vec<(&Path, &str)> = rendered
            .iter()
            .map(|p| (p.path(), p.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Path::new("blog/post"), "firis"),
                (Path::new("index.html"), "home"),
                (Path::new("about"), ""),
            ]
        );
    }

    #[test]
    fn test_render_error_names_page() {
        let fail = |_: &Document| -> Result<String> { Err(RenderError::Custom("nope".into())) };
        let pages = vec![Page::new("blog/post", Document::default())];

        let err = PageRenderer::new(fail).render(pages).unwrap_err();

        assert_eq!(err.to_string(), "failed to render blog/post: nope");
    }

    #[test]
    fn test_template_renderer_default_template() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("page.html", "<main>{{ content }}</main>"));
        let renderer = TemplateDocumentRenderer::new(registry, "page.html");

        let text = renderer.render(&Document::from_body("firis")).unwrap();

        assert_eq!(text, "<main>firis</main>");
    }

    #[test]
    fn test_template_renderer_uses_document_template() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("page.html", "{{ content }}"));
        registry.register(Template::new("post.html", "<h1>{{ title }}</h1>{{ content }}"));
        let renderer = TemplateDocumentRenderer::new(registry, "page.html");

        let mut document = Document::from_body("body");
        document.set("template", "post.html");
        document.set("title", "Sophie");

        assert_eq!(renderer.render(&document).unwrap(), "<h1>Sophie</h1>body");
    }

    #[test]
    fn test_template_renderer_globals() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("page.html", "{{ content }} | {{ site_title }}"));

        let mut site = serde_yaml::Mapping::new();
        site.insert("title".into(), "Atelier".into());
        let mut globals = Metadata::new();
        globals.insert("site".into(), Value::Mapping(site));

        let renderer = TemplateDocumentRenderer::new(registry, "page.html").with_globals(globals);

        assert_eq!(
            renderer.render(&Document::from_body("hi")).unwrap(),
            "hi | Atelier"
        );
    }

    #[test]
    fn test_template_renderer_unknown_template() {
        let renderer = TemplateDocumentRenderer::new(TemplateRegistry::new(), "missing.html");

        let err = renderer.render(&Document::default()).unwrap_err();

        assert!(matches!(
            err,
            RenderError::Template(TemplateError::NotFound(_))
        ));
    }
}
