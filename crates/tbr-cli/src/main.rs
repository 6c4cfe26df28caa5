//! tbr CLI
//!
//! Command-line interface for tbr - a reading list for your terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tbr_core::{BookStore, Config};

mod commands;
mod output;
mod prompt;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tbr")]
#[command(about = "tbr - a reading list for your terminal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Add a book to the reading list
    Add {
        /// Book title
        title: String,
        /// Author name
        #[arg(short, long)]
        author: Option<String>,
    },
    /// List books
    #[command(alias = "ls")]
    List {
        /// Show only books with this status (all, planning, reading, done)
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Show only titles containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Edit a book's title, author or status
    Edit {
        /// Book id (from `tbr list`)
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New author (empty clears it)
        #[arg(long)]
        author: Option<String>,
        /// New status (planning, reading, done)
        #[arg(long)]
        status: Option<String>,
    },
    /// Advance a book one status step (planning -> reading -> done)
    Status {
        /// Book id
        id: i64,
    },
    /// Remove a book
    #[command(alias = "rm")]
    Remove {
        /// Book id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Import book candidates from the remote endpoint
    Import {
        /// Endpoint to fetch from (defaults to the configured import_url)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, import_url)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Handle TUI (default when no command given); it manages its own
    // file-based logging
    if matches!(&cli.command, Some(Commands::Tui) | None) {
        return tui::run().await;
    }

    init_logging();

    // Config commands work on the file alone, no store needed
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    // Open the store; the database itself is opened lazily on first use
    let store = BookStore::open()?;

    match cli.command.unwrap() {
        Commands::Tui => unreachable!(),           // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Add { title, author } => {
            commands::book::add(&store, title, author, &output).await
        }
        Commands::List { status, search } => {
            commands::book::list(&store, status, search, &output).await
        }
        Commands::Edit {
            id,
            title,
            author,
            status,
        } => commands::book::edit(&store, id, title, author, status, &output).await,
        Commands::Status { id } => commands::book::cycle_status(&store, id, &output).await,
        Commands::Remove { id, force } => {
            commands::book::remove(&store, id, force, &output).await
        }
        Commands::Import { url } => handle_import(&store, url, &output).await,
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

async fn handle_import(store: &BookStore, url: Option<String>, output: &Output) -> Result<()> {
    let url = match url {
        Some(url) => url,
        None => {
            Config::load()
                .context("Failed to load configuration")?
                .import_url
        }
    };

    commands::import::run(store, &url, output).await
}

/// Stderr logging for the one-shot commands, honoring RUST_LOG
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
