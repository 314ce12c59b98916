//! `migrate` command

mod handler;

pub use handler::handle_migrate_command;

use clap::Args;
use std::path::PathBuf;

use crate::api::models::EntityType;

#[derive(Args, Debug)]
pub struct MigrateCommands {
    /// Only these entity types, comma-separated (pipeline order is kept)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<EntityType>,

    /// Read from both companies but log writes instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Id mapping file (overrides `migration.id_mapping_file`)
    #[arg(long)]
    pub mapping: Option<PathBuf>,
}
