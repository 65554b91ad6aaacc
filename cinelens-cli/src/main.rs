//! Cinelens CLI: clean movie metadata, load it into SQLite and browse the
//! aggregate report catalog.
//!
//! Runs the full pipeline and the interactive menu by default; subcommands
//! expose each step on its own.

mod commands;
mod menu;

use cinelens_core::ChartKind;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Cinelens: movie metadata cleaning and reports
#[derive(Parser, Debug)]
#[command(name = "cinelens", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommand (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Load, clean and persist the input file, then open the report menu
    Run {
        /// Input file (overrides `input.path`)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Load and clean the input file and print what the cleaning did
    Clean {
        /// Input file (overrides `input.path`)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Print the cleaning report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load, clean and persist the input file without opening the menu
    Ingest {
        /// Input file (overrides `input.path`)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List the report catalog
    Reports,
    /// Run one report against the existing store
    Report {
        /// Report id (1-10)
        id: u8,
        /// Render the result as a chart (bar, horizontal-bar, line, histogram, scatter, pie)
        #[arg(long)]
        chart: Option<ChartKind>,
        /// Number of rows to print
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },
    /// Open the interactive report menu against the existing store
    Menu,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug, PartialEq)]
pub(crate) enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file into the workspace
    Init,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "cinelens", "cinelens")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "cinelens.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut config = cinelens_core::config::load_config(Some(&workspace), cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    config.resolve_paths(&workspace);
    config.validate()?;

    if !cinelens_core::config::config_exists(Some(&workspace)) && cli.config.is_none() {
        tracing::debug!("no configuration file found, using defaults");
    }

    let command = cli.command.unwrap_or(Commands::Run { input: None });
    commands::handle_command(command, config, &workspace)
}
