//! Command-line interface

pub mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use commands::auth::AuthCommands;
use commands::mapping::MappingCommands;
use commands::migrate::MigrateCommands;

#[derive(Parser, Debug)]
#[command(name = "qbo-migrate")]
#[command(about = "Migrate accounting data between QuickBooks Online companies")]
#[command(version)]
pub struct Cli {
    /// Path to the credentials file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy accounts, employees, customers, classes, vendors and journal entries
    Migrate(MigrateCommands),

    /// Manage OAuth tokens
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Inspect or reset the persisted id mapping
    #[command(subcommand)]
    Mapping(MappingCommands),
}

impl Cli {
    /// Default log filter for the verbosity flags; `RUST_LOG` still wins
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
