//! frelia Generator Library
//!
//! Static site generation pipeline for frelia.
//!
//! # Modules
//!
//! - [`loader`] - Page loading from a content directory
//! - [`transform`] - Document and page transforms, groups and lifting
//! - [`template`] - Template system with variable interpolation
//! - [`render`] - Rendering documents into final page text
//! - [`writer`] - Writing rendered pages to the output directory
//! - [`assets`] - Static file linking
//! - [`sitemap`] - XML sitemap generation
//! - [`atom`] - Atom feed generation
//! - [`build`] - Build orchestration

pub mod assets;
pub mod atom;
pub mod build;
pub mod loader;
pub mod render;
pub mod sitemap;
pub mod template;
pub mod transform;
pub mod writer;

pub use assets::link_recursively;
pub use atom::FeedGenerator;
pub use build::{BuildError, BuildStats, Builder};
pub use loader::{LoadError, PageLoader};
pub use render::{DocumentRenderer, PageRenderer, TemplateDocumentRenderer};
pub use sitemap::{ChangeFreq, SitemapGenerator, SitemapUrl};
pub use template::{Template, TemplateContext, TemplateEngine, TemplateRegistry};
pub use transform::{LiftDocuments, Transform, TransformGroup};
pub use writer::PageWriter;
