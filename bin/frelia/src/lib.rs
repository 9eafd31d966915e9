//! frelia CLI Library
//!
//! This library provides the command implementations for the frelia static
//! site generator CLI. The binary entry point parses arguments and dispatches
//! here.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check, new)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use frelia::cmd;
//!
//! // Build a static site
//! cmd::build::run(Path::new("frelia.toml"), Some(Path::new("public"))).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use frelia_core::{Config, Document, Page};
pub use frelia_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
