mod commands;

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{prelude::*, EnvFilter};

use lvl_core::config::{self, AppConfig};

#[derive(Parser)]
#[command(name = "lvl")]
#[command(about = "lvl - a small game library launcher backed by your Steam library", long_about = None)]
#[command(version)]
struct Cli {
    /// Catalog database to use instead of the configured one
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Steam Web API key and account id, read from the environment when omitted.
#[derive(Args)]
struct CredentialArgs {
    /// Steam Web API key
    #[arg(env = "STEAM_API_KEY", hide_env_values = true)]
    api_key: String,
    /// SteamID64 of the account
    #[arg(env = "STEAM_ID")]
    steam_id: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List every catalogued game, sorted by name
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Import the account's owned games from Steam
    Sync {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Add a non-Steam game
    Add {
        /// Display name
        name: String,
        /// Path of the game's executable
        path: PathBuf,
        /// Minutes already played
        #[arg(long, default_value = "0")]
        playtime: u32,
    },

    /// Check an API key and Steam id
    Validate {
        #[command(flatten)]
        credentials: CredentialArgs,
        /// Also ask Steam whether the account exists
        #[arg(long)]
        online: bool,
    },

    /// Show the Steam profile behind the credentials
    Whoami {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Print where configuration, catalog and logs live
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if let Err(err) = config::ensure_default_config() {
        tracing::warn!("could not write default config: {err:#}");
    }
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    match cli.command {
        Commands::List { json } => commands::list(&config, json),
        Commands::Sync { credentials } => {
            commands::sync(&config, &credentials.api_key, &credentials.steam_id)
        }
        Commands::Add {
            name,
            path,
            playtime,
        } => commands::add(&config, &name, &path, playtime),
        Commands::Validate {
            credentials,
            online,
        } => commands::validate(
            &config,
            &credentials.api_key,
            &credentials.steam_id,
            online,
        ),
        Commands::Whoami { credentials } => {
            commands::whoami(&config, &credentials.api_key, &credentials.steam_id)
        }
        Commands::Paths => commands::paths(&config),
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,lvl_core=info,lvl_cli=info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let (file_layer, file_error) = match open_log_file(&config::log_dir()) {
        Ok(log_file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .compact()
                    .with_writer(Mutex::new(log_file)),
            ),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(err) = file_error {
        tracing::warn!("logging to stderr only: {err:#}");
    }
}

fn open_log_file(log_dir: &Path) -> Result<File> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("lvl.log");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))
}
