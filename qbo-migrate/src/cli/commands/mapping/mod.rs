//! `mapping` commands

mod handler;

pub use handler::handle_mapping_command;

use clap::Subcommand;
use std::path::PathBuf;

use crate::api::models::EntityType;

#[derive(Subcommand, Debug)]
pub enum MappingCommands {
    /// Print the persisted source → target ids
    Show {
        #[arg(long)]
        entity: Option<EntityType>,

        /// Id mapping file (overrides `migration.id_mapping_file`)
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Remove persisted entries
    Clear {
        #[arg(long)]
        entity: Option<EntityType>,

        /// Id mapping file (overrides `migration.id_mapping_file`)
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}
