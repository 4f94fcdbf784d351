//! cmdlog: search Elasticsearch log indices from the command line

use clap::Parser;
use cmdlog_client::{ClientConfig, SearchClient};
use cmdlog_core::Palette;
use cmdlog_repl::{App, Session, history};
use color_eyre::Result;
use std::fs::File;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// cmdlog: interactive log search client
#[derive(Parser, Debug)]
#[command(name = "cmdlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the search endpoint (default: $CMDLOG_URL or http://localhost:9200)
    #[arg(short, long)]
    url: Option<String>,

    /// Index pattern to search (default: $CMDLOG_INDEX or aos64-*)
    #[arg(short, long)]
    index: Option<String>,

    /// Request timeout in seconds (default: $CMDLOG_TIMEOUT_SECS or 30)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: <temp_dir>/cmdlog.log)
    #[arg(long)]
    log_file: Option<String>,

    /// Print results without terminal colors
    #[arg(long)]
    no_color: bool,

    /// Run a single command and exit, e.g. `cmdlog query host:gas06`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;

    // Log to a file, stdout carries the rendered results
    let log_path = resolve_log_path(cli.log_file.clone());
    let log_file = File::create(&log_path)?;

    let filter = if cli.debug {
        EnvFilter::from_default_env()
            .add_directive(Level::DEBUG.into())
            .add_directive("hyper=info".parse()?)
            .add_directive("hyper_util=info".parse()?)
            .add_directive("reqwest=info".parse()?)
            .add_directive("rustls=info".parse()?)
            .add_directive("h2=info".parse()?)
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();

    tracing::info!("Starting cmdlog");

    let config = client_config(&cli, ClientConfig::from_env());
    tracing::info!("Search endpoint: {}", config.search_url());

    let palette = if cli.no_color {
        Palette::plain()
    } else {
        Palette::ansi()
    };

    let client = SearchClient::new(config)?;
    let session = Session::with_palette(client, palette);
    let mut app = App::new(session, history::history_path())?;

    if cli.command.is_empty() {
        app.run().await?;
    } else {
        app.run_line(&cli.command.join(" ")).await?;
    }

    tracing::info!("Goodbye!");
    Ok(())
}

/// Apply command line overrides on top of the environment config
fn client_config(cli: &Cli, mut config: ClientConfig) -> ClientConfig {
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(index) = &cli.index {
        config.index_pattern = index.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config
}

/// Resolve the log file path, falling back to the platform temp directory.
fn resolve_log_path(log_file: Option<String>) -> PathBuf {
    match log_file {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join("cmdlog.log"),
    }
}
