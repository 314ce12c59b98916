//! Existence checks against a target catalog

use super::catalog::Catalog;
use super::types::{Entity, Vendor};
use crate::api::query::{Filter, Query};
use crate::api::tenant::{TenantApi, decode_all};

pub fn exists<E: Entity>(catalog: &Catalog<E>, key: &E::Key) -> bool {
    catalog.exists(key)
}

pub fn resolve<'a, E: Entity>(catalog: &'a Catalog<E>, key: &E::Key) -> Option<&'a E> {
    catalog.resolve(key)
}

/// Vendor lookup with a live `DisplayName` query when the snapshot misses
///
/// Only vendors get this fallback. A hit is added to the catalog so later
/// lookups in the same pass stay local; query errors count as a miss.
pub async fn resolve_vendor(
    catalog: &mut Catalog<Vendor>,
    tenant: &dyn TenantApi,
    display_name: &str,
) -> Option<Vendor> {
    let key = display_name.trim().to_string();
    if let Some(vendor) = catalog.resolve(&key) {
        return Some(vendor.clone());
    }

    let query = Query::new(Vendor::TYPE).filter(Filter::eq("DisplayName", key.as_str()));
    let found = match tenant.query(&query).await {
        Ok(raw) => decode_all::<Vendor>(Vendor::TYPE, raw),
        Err(err) => Err(err),
    };

    match found {
        Ok(vendors) => {
            let vendor = vendors.into_iter().next()?;
            log::debug!(
                "Vendor '{}' found by direct query (ID: {})",
                key,
                vendor.id.as_deref().unwrap_or("?")
            );
            Some(catalog.insert(vendor).clone())
        }
        Err(err) => {
            log::debug!("Error querying for vendor {}: {}", key, err);
            None
        }
    }
}
