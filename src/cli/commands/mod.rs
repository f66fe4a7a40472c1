//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod db;
mod init;
mod recent;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "booksum")]
#[command(about = "Upload PDF books and generate short, brief and detailed summaries")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the data directory and database
    Init,

    /// Start the web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT
        #[arg(long, short, default_value = "127.0.0.1:5000")]
        bind: String,
    },

    /// List the most recently uploaded books
    Recent {
        /// Number of books to show
        #[arg(short, long, default_value = "5")]
        limit: i64,
    },

    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create the summary table and add any missing columns
    Migrate,

    /// Copy records between databases, skipping filenames already present
    Copy {
        /// Target database URL (sqlite path or postgres://)
        #[arg(long)]
        to: String,
        /// Source database URL (defaults to the configured database)
        #[arg(long)]
        from: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (settings, config) = load_settings_with_options(options).await;

    if let Some(path) = config.source_path.as_deref() {
        tracing::debug!("Loaded config from {}", path.display());
    }
    if settings.uses_dev_secret() {
        tracing::warn!("SESSION_SECRET is not set; using the development secret");
    }

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Recent { limit } => recent::cmd_recent(&settings, limit).await,
        Commands::Db { command } => match command {
            DbCommands::Migrate => db::cmd_migrate(&settings).await,
            DbCommands::Copy { to, from } => {
                let from = from.unwrap_or_else(|| settings.database_url());
                db::cmd_db_copy(&from, &to, settings.pool_size).await
            }
        },
    }
}
