mod api;
mod cli;
mod config;
mod transfer;

use anyhow::Result;
use clap::Parser;

use cli::commands::auth::handle_auth_command;
use cli::commands::mapping::handle_mapping_command;
use cli::commands::migrate::handle_migrate_command;
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp_secs()
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Migrate(args) => handle_migrate_command(args, config_path).await,
        Commands::Auth(command) => handle_auth_command(command, config_path).await,
        Commands::Mapping(command) => handle_mapping_command(command, config_path).await,
    }
}
