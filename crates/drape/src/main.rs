//! Drape CLI - outfit analysis relay.
//!
//! Drape uploads an outfit photo to a vision provider, collects tags and
//! colors, and asks a language model for fashion recommendations. It runs
//! either as an HTTP relay for the browser client or directly on local files.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP relay
//! drape serve --port 5000
//!
//! # Analyze local photos
//! drape analyze outfit.jpg look2.png --format jsonl
//!
//! # Face attributes
//! drape face portrait.jpg
//!
//! # View configuration
//! drape config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use drape_core::Config;

mod cli;
mod logging;

/// Drape - outfit analysis with vision tagging and fashion recommendations.
#[derive(Parser, Debug)]
#[command(name = "drape")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "DRAPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP relay
    Serve(cli::serve::ServeArgs),

    /// Analyze local image files
    Analyze(cli::analyze::AnalyzeArgs),

    /// Detect face attributes in an image
    Face(cli::face::FaceArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Provider credentials usually live in a .env next to the service.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `drape config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Drape v{}", drape_core::VERSION);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Face(args) => cli::face::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}
