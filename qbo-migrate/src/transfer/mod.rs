//! Cross-company transfer engine
//!
//! Reconciles records of one QuickBooks company with another: finds what
//! already exists in the target, maps tenant-local references, copies the
//! rest and records every source → target id pair.

pub mod catalog;
pub mod copier;
pub mod existence;
pub mod mapper;
pub mod orchestrator;
pub mod types;

pub use catalog::{Catalog, load_catalog, load_target_catalog};
pub use mapper::ReferenceMapper;
pub use orchestrator::{PassContext, PassSummary, PipelineReport, run_entity_pass, run_pipeline};
pub use types::*;
