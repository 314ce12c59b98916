//! Entity catalog: every record of one type, indexed by matching key
//!
//! Primary keys win over alias keys; among primaries, and among aliases,
//! the first record seen keeps the slot and later ones are counted and
//! logged as duplicates.

use anyhow::{Context, Result};
use std::collections::HashMap;

use super::types::Entity;
use crate::api::models::EntityType;
use crate::api::tenant::{TenantApi, decode_all};
use crate::config::{CatalogFailurePolicy, IdMappingStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Primary,
    Alias,
}

#[derive(Debug, Clone)]
pub struct Catalog<E: Entity> {
    records: Vec<E>,
    index: HashMap<E::Key, (usize, SlotKind)>,
    by_id: HashMap<String, usize>,
    duplicates: usize,
}

impl<E: Entity> Default for Catalog<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            by_id: HashMap::new(),
            duplicates: 0,
        }
    }
}

impl<E: Entity> Catalog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a full record set
    pub fn build(records: Vec<E>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        if catalog.duplicates > 0 {
            log::warn!(
                "{} catalog has {} duplicate keys (using first match)",
                E::TYPE,
                catalog.duplicates
            );
        }
        catalog
    }

    /// Add a record under its primary and alias keys
    pub fn insert(&mut self, record: E) -> &E {
        let position = self.records.len();
        if let Some(id) = record.id() {
            self.by_id.entry(id.to_string()).or_insert(position);
        }

        if let Some(key) = record.display_key() {
            match self.index.get(&key) {
                Some((_, SlotKind::Primary)) => {
                    self.duplicates += 1;
                    log::debug!("Duplicate {} key '{}' ignored", E::TYPE, key);
                }
                _ => {
                    self.index.insert(key, (position, SlotKind::Primary));
                }
            }
        }

        for alias in record.alias_keys() {
            self.index
                .entry(alias)
                .or_insert((position, SlotKind::Alias));
        }

        self.records.push(record);
        &self.records[position]
    }

    /// Replace the record with the same id in place, or insert it
    pub fn upsert(&mut self, record: E) {
        let position = record.id().and_then(|id| self.by_id.get(id).copied());
        match position {
            Some(position) => self.records[position] = record,
            None => {
                self.insert(record);
            }
        }
    }

    pub fn resolve(&self, key: &E::Key) -> Option<&E> {
        self.index.get(key).map(|(i, _)| &self.records[*i])
    }

    pub fn exists(&self, key: &E::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&E> {
        self.by_id.get(id).map(|i| &self.records[*i])
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch and decode every record of `E` from a tenant
pub async fn load_records<E: Entity>(tenant: &dyn TenantApi, max_results: usize) -> Result<Vec<E>> {
    let raw = tenant
        .fetch_all(E::TYPE, max_results)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", E::TYPE.plural_label(), tenant.name()))?;
    let records: Vec<E> = decode_all(E::TYPE, raw)?;
    log::info!(
        "Retrieved {} {} from {} company",
        records.len(),
        E::TYPE.plural_label(),
        tenant.name()
    );
    Ok(records)
}

/// Fetch and index every record of `E` from a tenant
pub async fn load_catalog<E: Entity>(
    tenant: &dyn TenantApi,
    max_results: usize,
) -> Result<Catalog<E>> {
    Ok(Catalog::build(load_records(tenant, max_results).await?))
}

/// Load a target catalog, applying the catalog failure policy
///
/// Loaded Account and Class ids are registered as live target identities.
pub async fn load_target_catalog<E: Entity>(
    tenant: &dyn TenantApi,
    max_results: usize,
    policy: CatalogFailurePolicy,
    id_mapping: &mut IdMappingStore,
) -> Result<Catalog<E>> {
    let catalog = match load_catalog::<E>(tenant, max_results).await {
        Ok(catalog) => catalog,
        Err(err) => match policy {
            CatalogFailurePolicy::Abort => return Err(err),
            CatalogFailurePolicy::Empty => {
                log::error!(
                    "Error getting existing {}: {:#}; continuing with an empty catalog",
                    E::TYPE.plural_label(),
                    err
                );
                return Ok(Catalog::new());
            }
        },
    };

    if matches!(E::TYPE, EntityType::Account | EntityType::Class) {
        for id in catalog.records().iter().filter_map(|r| r.id()) {
            id_mapping.register_identity(E::TYPE, id);
        }
    }

    Ok(catalog)
}
