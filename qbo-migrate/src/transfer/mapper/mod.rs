//! Reference mapper
//!
//! Translates `{value, name}` references found on source records into the
//! equivalent target references. Every mapping returns `Option`: a reference
//! that cannot be mapped is omitted, never carried over with a source id.

mod account;
mod class;
mod party;

pub use class::class_name_candidates;

use anyhow::Result;

use super::catalog::{Catalog, load_catalog, load_target_catalog};
use super::types::{Account, Class, Department, Employee, Entity, Reference, TaxCode, Vendor};
use crate::api::models::EntityType;
use crate::api::tenant::TenantApi;
use crate::config::{CatalogFailurePolicy, IdMappingStore};

/// Maps source references onto a target company
pub struct ReferenceMapper<'a> {
    source: &'a dyn TenantApi,
    target: &'a dyn TenantApi,
    max_results: usize,
    target_accounts: Catalog<Account>,
    source_classes: Catalog<Class>,
    target_classes: Catalog<Class>,
    target_employees: Catalog<Employee>,
    target_vendors: Catalog<Vendor>,
    shared: SharedLists,
}

/// Tenant-local lookup lists, loaded on first use
#[derive(Default)]
struct SharedLists {
    source_tax_codes: Option<Catalog<TaxCode>>,
    target_tax_codes: Option<Catalog<TaxCode>>,
    source_departments: Option<Catalog<Department>>,
    target_departments: Option<Catalog<Department>>,
}

impl<'a> ReferenceMapper<'a> {
    pub fn new(source: &'a dyn TenantApi, target: &'a dyn TenantApi, max_results: usize) -> Self {
        Self {
            source,
            target,
            max_results,
            target_accounts: Catalog::new(),
            source_classes: Catalog::new(),
            target_classes: Catalog::new(),
            target_employees: Catalog::new(),
            target_vendors: Catalog::new(),
            shared: SharedLists::default(),
        }
    }

    /// Load the catalogs journal lines resolve against
    ///
    /// The source class list is cached whole so class lookups need no live
    /// calls. Target catalog failures follow `policy`.
    pub async fn load_journal_catalogs(
        &mut self,
        policy: CatalogFailurePolicy,
        id_mapping: &mut IdMappingStore,
    ) -> Result<()> {
        log::info!("Getting existing accounts from target company...");
        self.target_accounts =
            load_target_catalog(self.target, self.max_results, policy, id_mapping).await?;

        log::info!("Getting classes from source company...");
        self.source_classes = load_catalog(self.source, self.max_results).await?;

        log::info!("Getting existing classes from target company...");
        self.target_classes =
            load_target_catalog(self.target, self.max_results, policy, id_mapping).await?;

        log::info!("Getting existing employees from target company...");
        self.target_employees =
            load_target_catalog(self.target, self.max_results, policy, id_mapping).await?;

        log::info!("Getting existing vendors from target company...");
        self.target_vendors =
            load_target_catalog(self.target, self.max_results, policy, id_mapping).await?;

        Ok(())
    }

    /// Currency codes are shared by all companies
    pub fn map_currency(&self, reference: &Reference) -> Option<Reference> {
        Some(reference.clone())
    }

    /// Tax code by name; non-numeric pseudo codes ("TAX", "NON") are global
    pub async fn map_tax_code(&mut self, reference: &Reference) -> Option<Reference> {
        if !is_local_id(&reference.value) {
            return Some(reference.clone());
        }

        if self.shared.target_tax_codes.is_none() {
            self.shared.source_tax_codes = Some(lookup_list(self.source, self.max_results).await);
            self.shared.target_tax_codes = Some(lookup_list(self.target, self.max_results).await);
        }
        let source = self.shared.source_tax_codes.as_ref()?;
        let target = self.shared.target_tax_codes.as_ref()?;

        map_by_name(reference, source, target)
    }

    pub async fn map_department(&mut self, reference: &Reference) -> Option<Reference> {
        if self.shared.target_departments.is_none() {
            self.shared.source_departments =
                Some(lookup_list(self.source, self.max_results).await);
            self.shared.target_departments =
                Some(lookup_list(self.target, self.max_results).await);
        }
        let source = self.shared.source_departments.as_ref()?;
        let target = self.shared.target_departments.as_ref()?;

        map_by_name(reference, source, target)
    }
}

/// Parent reference through the mapping recorded earlier in the same pass
///
/// The mapped id must be present in the target catalog.
pub fn map_parent<E: Entity>(
    parent: &Reference,
    id_mapping: &IdMappingStore,
    target: &Catalog<E>,
) -> Option<Reference> {
    match id_mapping.get(E::TYPE, &parent.value) {
        Some(target_id) if target.contains_id(target_id) => {
            Some(Reference::new(target_id, parent.name.clone()))
        }
        Some(target_id) => {
            log::warn!(
                "Parent {} {} maps to {} which is not in the target company",
                E::TYPE,
                parent.value,
                target_id
            );
            None
        }
        None => {
            log::warn!("Parent {} {} not found in mapping", E::TYPE, parent.value);
            None
        }
    }
}

/// Accept an id-mapping entry only when its target id is live
fn mapped_target<'c, E: Entity>(
    entity: EntityType,
    source_id: &str,
    id_mapping: &IdMappingStore,
    target: &'c Catalog<E>,
) -> Option<&'c E> {
    id_mapping
        .get(entity, source_id)
        .and_then(|target_id| target.find_by_id(target_id))
}

fn is_local_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

async fn lookup_list<E: Entity>(tenant: &dyn TenantApi, max_results: usize) -> Catalog<E> {
    match load_catalog::<E>(tenant, max_results).await {
        Ok(catalog) => catalog,
        Err(err) => {
            log::error!(
                "Error getting {} from {} company: {:#}",
                E::TYPE.plural_label(),
                tenant.name(),
                err
            );
            Catalog::new()
        }
    }
}

/// Resolve a lookup-list reference by its name in the other company
fn map_by_name<E: Entity<Key = String>>(
    reference: &Reference,
    source: &Catalog<E>,
    target: &Catalog<E>,
) -> Option<Reference> {
    let name = match reference.hint() {
        "" => source.find_by_id(&reference.value)?.display_key()?,
        hint => hint.to_string(),
    };

    match target.resolve(&name) {
        Some(found) => Some(Reference::new(found.id()?, Some(name))),
        None => {
            log::warn!(
                "{} '{}' not found in target company - omitting reference",
                E::TYPE,
                name
            );
            None
        }
    }
}
