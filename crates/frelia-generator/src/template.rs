//! Template system for document bodies and page layouts.
//!
//! Provides a lightweight template system using string interpolation rather than
//! heavy template engines like Tera or Handlebars. Variables are written as
//! `{{ name }}`; `{{ name? }}` renders as empty text when `name` is unset.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use frelia_core::{Metadata, document::value_to_text};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),

    /// Template file could not be read.
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Separator joining nested metadata keys into one variable name.
const KEY_SEPARATOR: &str = "_";

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from document metadata.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mut context = Self::new();
        context.extend_metadata(metadata);
        context
    }

    /// Add every metadata field, replacing variables that already exist.
    ///
    /// Nested mappings are flattened: `{site: {title: x}}` becomes
    /// `site_title`.
    pub fn extend_metadata(&mut self, metadata: &Metadata) {
        for (key, value) in metadata {
            self.insert_value(key.clone(), value);
        }
    }

    fn insert_value(&mut self, key: String, value: &Value) {
        match value {
            Value::Mapping(mapping) => {
                for (nested_key, nested_value) in mapping {
                    let nested_key = value_to_text(nested_key);
                    self.insert_value(
                        format!("{key}{KEY_SEPARATOR}{nested_key}"),
                        nested_value,
                    );
                }
            }
            other => self.insert(key, value_to_text(other)),
        }
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a variable exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// Something that renders template text against a context.
pub trait TemplateEngine {
    /// Render template source text.
    fn render_str(&self, source: &str, context: &TemplateContext) -> Result<String>;

    /// Render a template looked up by name.
    fn render_named(&self, name: &str, context: &TemplateContext) -> Result<String>;
}

/// A simple template that supports variable interpolation.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        interpolate(&self.content, context)
    }
}

/// Replace all `{{ variable }}` placeholders with values from the context.
///
/// Substituted values are not scanned again.
pub fn interpolate(source: &str, context: &TemplateContext) -> Result<String> {
    let mut result = source.to_string();
    let mut pos = 0;

    while let Some(start) = result[pos..].find("{{") {
        let start = pos + start;
        let end = result[start..]
            .find("}}")
            .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;
        let end = start + end + 2;

        let var_name = result[start + 2..end - 2].trim();

        let (var_name, optional) = if let Some(stripped) = var_name.strip_suffix('?') {
            (stripped.trim_end(), true)
        } else {
            (var_name, false)
        };

        if var_name.is_empty() {
            return Err(TemplateError::InvalidSyntax(
                "empty variable name".to_string(),
            ));
        }

        let value = match context.get(var_name) {
            Some(v) => v.to_string(),
            None if optional => String::new(),
            None => return Err(TemplateError::MissingVariable(var_name.to_string())),
        };

        result.replace_range(start..end, &value);
        pos = start + value.len();
    }

    Ok(result)
}

/// Registry of named templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(Template::new(BASE_TEMPLATE_NAME, DEFAULT_BASE_TEMPLATE));
        registry
    }

    /// Register a template, replacing any template with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Register every file under `dir`, named by its path relative to `dir`
    /// with `/` separators.
    ///
    /// A missing directory registers nothing.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            debug!(dir = %dir.display(), "template directory does not exist, skipping");
            return Ok(0);
        }

        let mut count = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| TemplateError::Io {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = template_name(dir, path);
            let content = fs::read_to_string(path).map_err(|source| TemplateError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            debug!(name = %name, "registered template");
            self.register(Template::new(name, content));
            count += 1;
        }

        info!(dir = %dir.display(), count, "loaded templates");
        Ok(count)
    }
}

impl TemplateEngine for TemplateRegistry {
    fn render_str(&self, source: &str, context: &TemplateContext) -> Result<String> {
        interpolate(source, context)
    }

    fn render_named(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

fn template_name(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Name of the built-in page layout.
pub const BASE_TEMPLATE_NAME: &str = "base.html";

/// Built-in page layout.
pub const DEFAULT_BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title? }}</title>
</head>
<body>
{{ content }}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_interpolation() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new().with_var("name", "Firis");
        assert_eq!(template.render(&ctx).unwrap(), "Hello, Firis!");
    }

    #[test]
    fn test_multiple_variables() {
        let template = Template::new("test", "{{ greeting }}, {{ name }}!");
        let ctx = TemplateContext::new()
            .with_var("greeting", "Hi")
            .with_var("name", "Sophie");
        assert_eq!(template.render(&ctx).unwrap(), "Hi, Sophie!");
    }

    #[test]
    fn test_optional_variable() {
        let ctx = TemplateContext::new();
        assert_eq!(interpolate("a{{ missing? }}b", &ctx).unwrap(), "ab");
    }

    #[test]
    fn test_missing_required_variable() {
        let result = interpolate("Hello, {{ name }}!", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::MissingVariable(v)) if v == "name"));
    }

    #[test]
    fn test_unclosed_delimiter() {
        let result = interpolate("Hello, {{ name", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::InvalidSyntax(_))));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let ctx = TemplateContext::new()
            .with_var("a", "{{ b }}")
            .with_var("b", "nope");
        assert_eq!(interpolate("{{ a }}", &ctx).unwrap(), "{{ b }}");
    }

    #[test]
    fn test_context_from_nested_metadata() {
        let mut site = serde_yaml::Mapping::new();
        site.insert("title".into(), "Takumi Times".into());
        let mut metadata = Metadata::new();
        metadata.insert("site".into(), Value::Mapping(site));
        metadata.insert("tags".into(), Value::Sequence(vec!["a".into(), "b".into()]));
        metadata.insert("count".into(), 3.into());

        let ctx = TemplateContext::from_metadata(&metadata);
        assert_eq!(ctx.get("site_title"), Some("Takumi Times"));
        assert_eq!(ctx.get("tags"), Some("a, b"));
        assert_eq!(ctx.get("count"), Some("3"));
        assert!(!ctx.contains("site"));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = TemplateRegistry::new();
        assert!(registry.get(BASE_TEMPLATE_NAME).is_some());

        let ctx = TemplateContext::new().with_var("content", "<p>body</p>");
        let html = registry.render_named(BASE_TEMPLATE_NAME, &ctx).unwrap();
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("<title></title>"));
    }

    #[test]
    fn test_registry_not_found() {
        let registry = TemplateRegistry::new();
        let result = registry.render_named("missing.html", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("base.html"), "custom {{ content }}").unwrap();
        fs::write(dir.path().join("blog/post.html"), "post {{ title }}").unwrap();

        let mut registry = TemplateRegistry::new();
        let count = registry.load_dir(dir.path()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(registry.len(), 2);
        let ctx = TemplateContext::new()
            .with_var("content", "x")
            .with_var("title", "y");
        assert_eq!(registry.render_named("base.html", &ctx).unwrap(), "custom x");
        assert_eq!(registry.render_named("blog/post.html", &ctx).unwrap(), "post y");
    }

    #[test]
    fn test_load_missing_dir() {
        let mut registry = TemplateRegistry::new();
        let count = registry
            .load_dir(Path::new("/nonexistent/templates"))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(registry.len(), 1);
    }
}
