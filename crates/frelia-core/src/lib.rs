//! frelia Core Library
//!
//! Documents, pages, the Enja document codec, path-derived values and site
//! configuration for the frelia static site generator.

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod page;
pub mod path;

pub use codec::{DocumentCodec, Enja};
pub use config::Config;
pub use document::{Document, Metadata};
pub use error::{CoreError, Result};
pub use page::{Page, RenderedPage};
pub use path::PathDateError;
