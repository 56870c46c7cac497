//! Hearth CLI - Command-line interface for the Hearth household store.
//!
//! Drives the same household service the app screens use: profiles,
//! families, residences, vehicles and their upkeep, plus database
//! maintenance. Useful for scripting, debugging and seeding data.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use hearth_core::config::{AppConfig, ConfigHandle, StoreBackend};
use hearth_core::error::HearthResult;
use hearth_core::logging;
use hearth_core::platform::Platform;

/// Hearth - household management from the terminal.
#[derive(Parser)]
#[command(
    name = "hearth",
    version,
    about = "Hearth household management CLI",
    long_about = "A command-line interface for the Hearth household store.\n\
                   Manage families, residences, vehicles and their upkeep."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Use an in-memory store; state is discarded when the command exits,
    /// so later invocations never see it.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and inspect user profiles.
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Create, join and edit families.
    Family {
        #[command(subcommand)]
        action: commands::family::FamilyAction,
    },
    /// Manage a family's residences.
    Residence {
        #[command(subcommand)]
        action: commands::residence::ResidenceAction,
    },
    /// Manage a family's vehicles and their maintenance.
    Vehicle {
        #[command(subcommand)]
        action: commands::vehicle::VehicleAction,
    },
    /// Database management commands.
    Db {
        #[command(subcommand)]
        action: commands::db::DbAction,
    },
}

#[tokio::main]
async fn main() -> HearthResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from_file(std::path::Path::new(path))?,
        None => AppConfig::load_default()?,
    };
    if cli.memory {
        config.store.backend = StoreBackend::Memory;
    }

    // Initialize logging
    let log_level = if cli.verbose { "debug".to_string() } else { config.logging.level.clone() };
    let _guard = if cli.memory {
        logging::init_console_logging(&log_level);
        None
    } else {
        let log_dir = config
            .effective_log_dir()
            .unwrap_or_else(|_| PathBuf::from(".").join("logs"));
        Some(logging::init_logging(&log_level, &log_dir, config.logging.json_output)?)
    };

    info!(
        "{} CLI v{} on {} ({:?} store)",
        hearth_core::constants::APP_NAME,
        hearth_core::constants::APP_VERSION,
        Platform::current(),
        config.store.backend
    );

    let config_handle = ConfigHandle::new(config);

    // Dispatch to command handlers
    match cli.command {
        Commands::Profile { action } => {
            commands::profile::run(config_handle, action, cli.format).await
        }
        Commands::Family { action } => {
            commands::family::run(config_handle, action, cli.format).await
        }
        Commands::Residence { action } => {
            commands::residence::run(config_handle, action, cli.format).await
        }
        Commands::Vehicle { action } => {
            commands::vehicle::run(config_handle, action, cli.format).await
        }
        Commands::Db { action } => {
            commands::db::run(config_handle, action, cli.format).await
        }
    }
}
