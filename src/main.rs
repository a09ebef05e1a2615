mod campus;
mod commands;
mod config;
mod db;
mod error;
mod models;
mod progress;
mod snapshot;
mod tasks;

use clap::Parser;
use commands::Cli;
use config::Config;
use db::Database;
use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;

// SQLite allows one writer; a small pool is plenty for a CLI
const MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize database
    let database = match Database::new(&config.database_url, MAX_CONNECTIONS).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Using database {}", config.database_url);

    if let Err(why) = commands::handle_command(database, &config, cli).await {
        error!("Command failed: {}", why);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
