//! Repository layer for persisted migration state

pub mod id_mappings;
