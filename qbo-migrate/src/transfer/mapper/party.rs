//! Employee/vendor references on journal lines

use super::{ReferenceMapper, mapped_target};
use crate::api::tenant::decode;
use crate::config::IdMappingStore;
use crate::transfer::catalog::Catalog;
use crate::transfer::types::{Employee, Entity, PartyRef, Reference, Vendor};

impl ReferenceMapper<'_> {
    /// Map a line's party; `None` is a soft failure
    pub async fn map_party(&self, party: &PartyRef, id_mapping: &IdMappingStore) -> Option<PartyRef> {
        match party {
            PartyRef::Employee(reference) => self
                .map_employee(reference, id_mapping)
                .await
                .map(PartyRef::Employee),
            PartyRef::Vendor(reference) => self
                .map_vendor(reference, id_mapping)
                .await
                .map(PartyRef::Vendor),
        }
    }

    async fn map_employee(
        &self,
        reference: &Reference,
        id_mapping: &IdMappingStore,
    ) -> Option<Reference> {
        let source = self.fetch_source::<Employee>(reference).await;
        let names = candidate_names(
            source.as_ref().map(|e| e.full_name()),
            source.as_ref().and_then(|e| e.display_name.clone()),
            reference,
        );
        resolve_party(&self.target_employees, reference, &names, id_mapping)
    }

    async fn map_vendor(
        &self,
        reference: &Reference,
        id_mapping: &IdMappingStore,
    ) -> Option<Reference> {
        let source = self.fetch_source::<Vendor>(reference).await;
        let full_name = source.as_ref().map(|v| {
            format!(
                "{} {}",
                v.given_name.as_deref().unwrap_or_default().trim(),
                v.family_name.as_deref().unwrap_or_default().trim()
            )
            .trim()
            .to_string()
        });
        let names = candidate_names(
            full_name,
            source.as_ref().and_then(|v| v.display_name.clone()),
            reference,
        );
        resolve_party(&self.target_vendors, reference, &names, id_mapping)
    }

    /// Read the canonical source record; failures degrade to the reference hint
    async fn fetch_source<E: Entity>(&self, reference: &Reference) -> Option<E> {
        let raw = match self.source.fetch_one(E::TYPE, &reference.value).await {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("Source {} {} could not be read: {}", E::TYPE, reference.value, err);
                return None;
            }
        };
        decode::<E>(E::TYPE, raw)
            .map_err(|err| log::warn!("Source {} {}: {}", E::TYPE, reference.value, err))
            .ok()
    }
}

/// Full name, display name, then the hint carried on the reference
fn candidate_names(
    full_name: Option<String>,
    display_name: Option<String>,
    reference: &Reference,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in [full_name, display_name, Some(reference.hint().to_string())]
        .into_iter()
        .flatten()
    {
        let name = name.trim().to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn resolve_party<E: Entity<Key = String>>(
    target: &Catalog<E>,
    reference: &Reference,
    names: &[String],
    id_mapping: &IdMappingStore,
) -> Option<Reference> {
    for name in names {
        if let Some(found) = target.resolve(name) {
            log::info!("Found matching {} in target company: {}", E::TYPE, name);
            return Some(Reference::new(found.id()?, Some(name.clone())));
        }
    }

    if let Some(found) = mapped_target(E::TYPE, &reference.value, id_mapping, target) {
        log::info!("{} {} resolved through id mapping", E::TYPE, reference);
        return Some(Reference::new(found.id()?, found.display_key()));
    }

    log::warn!(
        "{} not found in target company. Tried names: {} - continuing without entity",
        E::TYPE,
        names.join(", ")
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTenant;
    use crate::api::models::EntityType;
    use crate::config::CatalogFailurePolicy;
    use serde_json::json;

    #[tokio::test]
    async fn test_employee_by_full_name() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(
            EntityType::Employee,
            json!({"Id": "4", "GivenName": "Emily", "FamilyName": "Platt", "DisplayName": "Em"}),
        );
        let emily = target.seed(
            EntityType::Employee,
            json!({"GivenName": "Emily", "FamilyName": "Platt", "Active": true}),
        );

        let mut ids = IdMappingStore::new();
        let mut mapper = ReferenceMapper::new(&source, &target, 1000);
        mapper
            .load_journal_catalogs(CatalogFailurePolicy::Abort, &mut ids)
            .await
            .unwrap();

        let mapped = mapper
            .map_party(&PartyRef::Employee(Reference::new("4", Some("Em".into()))), &ids)
            .await
            .unwrap();
        assert_eq!(mapped, PartyRef::Employee(Reference::new(emily, Some("Emily Platt".into()))));
    }

    #[tokio::test]
    async fn test_vendor_by_hint_when_source_unreadable() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        let acme = target.seed(EntityType::Vendor, json!({"DisplayName": "Acme"}));

        let mut ids = IdMappingStore::new();
        let mut mapper = ReferenceMapper::new(&source, &target, 1000);
        mapper
            .load_journal_catalogs(CatalogFailurePolicy::Abort, &mut ids)
            .await
            .unwrap();

        let mapped = mapper
            .map_party(&PartyRef::Vendor(Reference::new("77", Some("Acme".into()))), &ids)
            .await
            .unwrap();
        assert_eq!(mapped.reference().value, acme);
    }

    #[tokio::test]
    async fn test_unmatched_party_is_soft_failure() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(EntityType::Vendor, json!({"Id": "9", "DisplayName": "Gone"}));

        let ids = IdMappingStore::new();
        let mapper = ReferenceMapper::new(&source, &target, 1000);
        assert!(
            mapper
                .map_party(&PartyRef::Vendor(Reference::new("9", None)), &ids)
                .await
                .is_none()
        );
    }
}
