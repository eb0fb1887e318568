//! catspotter CLI - Command-line interface
//!
//! This binary provides a command-line interface to the catspotter library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::locate::LocateArgs;
use commands::permission::PermissionArgs;
use commands::watch::WatchArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "catspotter")]
#[command(version)]
#[command(about = "Find where you are before reporting a cat sighting", long_about = None)]
struct Cli {
    /// Enable debug logging and mirror log output to stdout
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate yourself once
    Locate(LocateArgs),

    /// Print position updates as they arrive
    Watch(WatchArgs),

    /// Report the location permission state
    Permission(PermissionArgs),

    /// Show the accuracy tier for a radius in meters
    Classify {
        /// Accuracy radius in meters
        #[arg(allow_hyphen_values = true)]
        meters: f64,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Classify { meters } => commands::classify::run(meters),
        Commands::Config(command) => commands::config::run(command),
        Commands::Locate(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            runner.log_startup("locate");
            commands::locate::run(&runner, args).await
        }
        Commands::Watch(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            runner.log_startup("watch");
            commands::watch::run(&runner, args).await
        }
        Commands::Permission(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            runner.log_startup("permission");
            commands::permission::run(&runner, args).await
        }
    }
}
