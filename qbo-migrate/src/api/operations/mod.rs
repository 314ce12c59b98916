//! QuickBooks Online Operations Module
//!
//! Describes the REST calls the migration engine issues so the HTTP client,
//! dry-run wrapper and logs all speak about them the same way.

pub mod operation;

pub use operation::Operation;
