//! Persisted source → target id mapping

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::api::models::EntityType;

/// `entity type -> { source id -> target id }`
///
/// Serialized as the flat JSON object
/// `{"Account": {"12": "87"}, "Class": {...}}`. Target-identity
/// registrations made while loading target catalogs are kept in memory only
/// and never written out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdMappingStore {
    entries: BTreeMap<EntityType, BTreeMap<String, String>>,
    #[serde(skip)]
    identities: BTreeMap<EntityType, BTreeSet<String>>,
}

impl IdMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previous run's mapping; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "No id mapping found at {}, starting with an empty mapping",
                path.display()
            );
            return Ok(Self::new());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read id mapping {}", path.display()))?;
        let store: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse id mapping {}", path.display()))?;
        log::info!(
            "Loaded {} id mappings from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Write the mapping, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize id mapping")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace id mapping {}", path.display()))?;
        log::debug!("Saved {} id mappings to {}", self.len(), path.display());
        Ok(())
    }

    /// Record that `source_id` corresponds to `target_id`
    pub fn record(&mut self, entity: EntityType, source_id: &str, target_id: &str) {
        let previous = self
            .entries
            .entry(entity)
            .or_default()
            .insert(source_id.to_string(), target_id.to_string());
        if let Some(previous) = previous.filter(|p| p != target_id) {
            log::warn!(
                "{} {} was mapped to {}, now mapped to {}",
                entity,
                source_id,
                previous,
                target_id
            );
        }
    }

    /// Target id recorded for a source id
    pub fn get(&self, entity: EntityType, source_id: &str) -> Option<&str> {
        self.entries
            .get(&entity)
            .and_then(|m| m.get(source_id))
            .map(|s| s.as_str())
    }

    /// Note that `id` is a live target id of this type
    pub fn register_identity(&mut self, entity: EntityType, id: &str) {
        self.identities
            .entry(entity)
            .or_default()
            .insert(id.to_string());
    }

    pub fn is_identity(&self, entity: EntityType, id: &str) -> bool {
        self.identities
            .get(&entity)
            .is_some_and(|ids| ids.contains(id))
    }

    pub fn entries(&self, entity: EntityType) -> Option<&BTreeMap<String, String>> {
        self.entries.get(&entity)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entries.keys()
    }

    /// Number of source → target entries
    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry of one type, or all entries; returns how many went
    pub fn clear(&mut self, entity: Option<EntityType>) -> usize {
        match entity {
            Some(entity) => self.entries.remove(&entity).map(|m| m.len()).unwrap_or(0),
            None => {
                let removed = self.len();
                self.entries.clear();
                removed
            }
        }
    }
}
