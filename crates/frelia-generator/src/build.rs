//! Build orchestration.
//!
//! Coordinates the full site build: load, transform, render, write.

use std::{fs, time::Instant};

use frelia_core::{Config, Document, Enja, Metadata, Page, RenderedPage};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    assets::{AssetError, link_recursively},
    atom::{FeedError, FeedGenerator},
    loader::{LoadError, PageLoader},
    render::{PageRenderer, RenderError, TemplateDocumentRenderer},
    sitemap::{SitemapError, SitemapGenerator},
    template::{TemplateEngine, TemplateError, TemplateRegistry},
    transform::{
        CopyMetadata, DateFromPath, LiftDocuments, RebasePath, RenderTemplate, SetDefaultMetadata,
        StripExtension, Transform, TransformError, TransformGroup,
    },
    writer::{PageWriter, WriteError},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page loading error.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Transform error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Page writing error.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// Static file error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Feed generation error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages written.
    pub pages: usize,

    /// Number of static files linked.
    pub static_files: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration this builder uses.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let build = &self.config.build;

        info!(
            content = %build.content_dir.display(),
            output = %build.output_dir.display(),
            "starting build"
        );

        // 1. Clean output directory
        self.clean_output()?;

        // 2. Load templates and pages
        let mut templates = TemplateRegistry::new();
        templates.load_dir(&build.template_dir)?;

        let mut pages = PageLoader::new(Enja)
            .sorted()
            .load_all(&build.content_dir)?;

        // 3. Transform
        let pipeline = self.pipeline(templates.clone());
        debug!(?pipeline, "applying page transforms");
        pipeline.apply(&mut pages)?;

        // 4. Sitemap and feed, from the transformed metadata
        let mut extra = Vec::new();
        if self.config.sitemap.enabled {
            let xml = SitemapGenerator::new(&self.config).generate(&pages)?;
            extra.push(RenderedPage::new(&self.config.sitemap.path, xml));
        }
        if self.config.feed.enabled {
            let xml = FeedGenerator::new(&self.config).generate(&pages)?;
            extra.push(RenderedPage::new(&self.config.feed.path, xml));
        }

        // 5. Render and write
        let renderer = TemplateDocumentRenderer::new(templates, build.default_template.as_str())
            .with_globals(self.globals());
        let rendered = PageRenderer::new(renderer).render(pages)?;

        let writer = PageWriter::new(&build.output_dir);
        stats.pages = writer.write(&rendered)?;
        writer.write(&extra)?;

        // 6. Link static files
        if let Some(static_dir) = &build.static_dir {
            stats.static_files = link_recursively(static_dir, &build.output_dir)?;
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            static_files = stats.static_files,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// The page transforms a build applies, in order.
    ///
    /// Paths are rebased onto the content directory and given pretty URLs
    /// before dates are read from them. Metadata defaults and copies run
    /// next, and bodies are rendered as templates last so they see the
    /// finished metadata.
    pub fn pipeline<E>(&self, engine: E) -> TransformGroup<Page>
    where
        E: TemplateEngine + 'static,
    {
        let build = &self.config.build;
        let metadata = &self.config.metadata;

        let strip = if build.strip_extension_ignore_case {
            StripExtension::ignore_case()
        } else {
            StripExtension::new()
        };

        let mut documents: TransformGroup<Document> =
            TransformGroup::new().with(SetDefaultMetadata::new(metadata.defaults.clone()));
        for rule in &metadata.copy {
            documents.push(CopyMetadata::new(rule.from.as_str(), rule.to.as_str()));
        }
        documents.push(RenderTemplate::new(engine).with_globals(self.globals()));

        TransformGroup::new()
            .with(RebasePath::new(&build.content_dir))
            .with(strip)
            .with(DateFromPath::new(metadata.date_field.as_str()))
            .with(LiftDocuments::new(documents))
    }

    /// Values every template sees beneath the document's own metadata.
    fn globals(&self) -> Metadata {
        let site = &self.config.site;
        let mut mapping = Mapping::new();
        mapping.insert("title".into(), site.title.as_str().into());
        mapping.insert("base_url".into(), site.base_url.as_str().into());
        if let Some(author) = &site.author {
            mapping.insert("author".into(), author.as_str().into());
        }

        let mut globals = Metadata::new();
        globals.insert("site".to_string(), Value::Mapping(mapping));
        globals
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        let output_dir = &self.config.build.output_dir;
        if output_dir.exists() {
            debug!(dir = %output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(output_dir)?;
        }
        fs::create_dir_all(output_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use frelia_core::config::CopyRule;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_config(root: &Path) -> Config {
        let mut config = Config::new("Atelier", "https://example.com");
        config.build.content_dir = root.join("content");
        config.build.output_dir = root.join("public");
        config.build.template_dir = root.join("templates");
        config
    }

    #[test]
    fn test_pipeline_order() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.metadata.copy = vec![CopyRule {
            from: "published".to_string(),
            to: "updated".to_string(),
        }];
        let content = config.build.content_dir.clone();
        let builder = Builder::new(config);

        let mut pages = vec![Page::new(
            content.join("blog/2010/01/02/post.html"),
            Document::from_body("{{ site_title }}: {{ published }}"),
        )];

        builder
            .pipeline(TemplateRegistry::new())
            .apply(&mut pages)
            .unwrap();

        assert_eq!(pages[0].path, Path::new("blog/2010/01/02/post"));
        assert_eq!(pages[0].document.get_str("updated"), Some("2010-01-02"));
        assert_eq!(pages[0].document.body, "Atelier: 2010-01-02");
    }

    #[test]
    fn test_build() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "content/blog/2016/01/08/pandora.html",
            "title: Pandora\n---\n<p>{{ title }}</p>",
        );
        write(root, "content/index.html", "title: Home\n---\nwelcome");
        write(
            root,
            "templates/base.html",
            "<title>{{ title }} | {{ site_title }}</title>{{ content }}",
        );
        write(root, "static/style.css", "body {}");

        let mut config = test_config(root);
        config.build.static_dir = Some(root.join("static"));
        fs::create_dir_all(root.join("public/stale")).unwrap();

        let stats = Builder::new(config).build().unwrap();

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.static_files, 1);
        assert_eq!(
            fs::read_to_string(root.join("public/blog/2016/01/08/pandora")).unwrap(),
            "<title>Pandora | Atelier</title><p>Pandora</p>"
        );
        assert_eq!(
            fs::read_to_string(root.join("public/index.html")).unwrap(),
            "<title>Home | Atelier</title>welcome"
        );
        assert!(root.join("public/style.css").exists());
        assert!(!root.join("public/stale").exists());

        let sitemap = fs::read_to_string(root.join("public/sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/blog/2016/01/08/pandora</loc>"));
        assert!(sitemap.contains("<lastmod>2016-01-08</lastmod>"));
        assert!(sitemap.contains("<loc>https://example.com/</loc>"));

        let feed = fs::read_to_string(root.join("public/atom.xml")).unwrap();
        assert!(feed.contains("https://example.com/blog/2016/01/08/pandora"));
    }

    #[test]
    fn test_build_without_sitemap_and_feed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "content/page", "---\nplain");

        let mut config = test_config(root);
        config.sitemap.enabled = false;
        config.feed.enabled = false;

        Builder::new(config).build().unwrap();

        assert!(root.join("public/page").exists());
        assert!(!root.join("public/sitemap.xml").exists());
        assert!(!root.join("public/atom.xml").exists());
    }

    #[test]
    fn test_build_fails_on_malformed_document() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "content/bad", "- a\n- b\n---\nbody");

        let err = Builder::new(test_config(root)).build().unwrap_err();

        assert!(matches!(err, BuildError::Load(LoadError::Decode { .. })));
    }
}
