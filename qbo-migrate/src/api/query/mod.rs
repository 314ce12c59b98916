//! QuickBooks query language builder
//!
//! Builds `SELECT * FROM <Entity> WHERE ... STARTPOSITION n MAXRESULTS m`
//! statements. Follows the same split as operations: filters describe a
//! predicate, `Query` is the reusable statement.

pub mod filters;
pub mod query;

pub use filters::{Filter, FilterValue};
pub use query::Query;
