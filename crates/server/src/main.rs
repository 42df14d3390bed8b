use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

pub(crate) mod auth;
pub(crate) mod config;
pub(crate) mod database;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod media;
pub(crate) mod models;
pub(crate) mod server;
pub(crate) mod slug;


#[derive(Debug, Parser)]
#[command(version, about = "Digital library server with course discovery")]
struct Cli {
    /// YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply the schema migration and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_yaml_file(cli.config)?.with_env_overrides();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run_all(&config).await?,
        Command::Migrate => server::run_migration(&config).await?,
    }

    Ok(())
}
