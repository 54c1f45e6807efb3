use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cineseek::config::{Config, LoggingConfig};

mod cli;

#[derive(Parser)]
#[command(name = "cineseek")]
#[command(about = "Identify a movie from a short quote", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.cineseek/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search subtitles for a single quote
    Search {
        /// Quote to look for
        query: String,
        /// Maximum number of movies to return
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Identify a movie from a transcript
    Identify {
        #[command(flatten)]
        input: cli::TranscriptInput,
        /// Print the identification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the phrases that would be searched for a transcript
    Phrases {
        #[command(flatten)]
        input: cli::TranscriptInput,
        /// Words per phrase
        #[arg(long)]
        length: Option<usize>,
        /// Number of phrases to keep
        #[arg(long)]
        count: Option<usize>,
    },
    /// Show corpus connection status
    Info,
    /// Show version information
    Version,
}

fn init_logging(logging: &LoggingConfig, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // Logs go to stderr so JSON output on stdout stays parseable.
    if json || logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .with_context(|| "Failed to load configuration")?;

    init_logging(&config.logging, cli.log_json);

    match cli.command {
        Some(Commands::Version) | None => {
            println!("cineseek {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Search { query, limit, json }) => {
            cli::cmd_search(&config, &query, limit, json).await?;
        }
        Some(Commands::Identify { input, json }) => {
            cli::cmd_identify(&config, &input, json).await?;
        }
        Some(Commands::Phrases {
            input,
            length,
            count,
        }) => {
            cli::cmd_phrases(&config, &input, length, count)?;
        }
        Some(Commands::Info) => {
            cli::cmd_info(&config).await?;
        }
    }

    Ok(())
}
