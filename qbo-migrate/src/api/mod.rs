//! QuickBooks Online API Module
//!
//! The tenant surface the migration engine talks to: the [`TenantApi`]
//! trait, the REST client implementing it, query building, OAuth tokens
//! and the dry-run wrapper.

pub mod auth;
pub mod client;
pub mod dry_run;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod operations;
pub mod query;
pub mod tenant;

pub use auth::AuthManager;
pub use client::QuickBooksClient;
pub use dry_run::DryRunTenant;
pub use error::ApiError;
pub use models::{EntityType, Environment, TokenInfo};
pub use operations::Operation;
pub use query::{Filter, FilterValue, Query};
pub use tenant::TenantApi;
