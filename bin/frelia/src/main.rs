//! frelia CLI
//!
//! Static site generator for YAML front-matter documents.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for frelia.
#[derive(Parser)]
#[command(
    name = "frelia",
    version,
    about = "A static site generator for YAML front-matter documents"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "frelia.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (overrides build.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Validate configuration and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Create a new content document
    New {
        /// Path below the content directory (e.g., blog/2016/01/08/post.html)
        path: std::path::PathBuf,
        /// Document title (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    frelia::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output } => {
            frelia::cmd::build::run(&cli.config, output.as_deref())?;
        }
        Commands::Check { strict } => {
            frelia::cmd::check::run(&cli.config, strict)?;
        }
        Commands::New { path, title } => {
            frelia::cmd::new::run(&cli.config, &path, title.as_deref())?;
        }
    }

    Ok(())
}
