//! `auth` commands

mod handler;

pub use handler::{handle_auth_command, refresh_company};

use clap::Subcommand;

use crate::config::CompanyRole;

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Refresh OAuth tokens and save them to the config file
    Refresh {
        /// source or target; both when omitted
        #[arg(long)]
        company: Option<CompanyRole>,
    },

    /// Authorize a company interactively
    Login {
        /// source or target
        #[arg(long)]
        company: CompanyRole,
    },
}
