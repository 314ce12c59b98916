//! Dry-run tenant wrapper
//!
//! Reads go to the wrapped tenant; writes are logged and answered with
//! synthetic ids so the rest of a pass behaves as it would for real.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::ApiError;
use super::models::EntityType;
use super::operations::Operation;
use super::query::Query;
use super::tenant::TenantApi;

pub struct DryRunTenant<T: TenantApi> {
    inner: T,
    next_id: AtomicUsize,
    writes: AtomicUsize,
}

impl<T: TenantApi> DryRunTenant<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            next_id: AtomicUsize::new(1),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of writes that would have been sent
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn log_write(&self, operation: &Operation) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let name = operation
            .body()
            .and_then(|b| {
                b.get("DisplayName")
                    .or_else(|| b.get("FullyQualifiedName"))
                    .or_else(|| b.get("Name"))
                    .or_else(|| b.get("DocNumber"))
            })
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        log::info!(
            "[dry-run] {} {} '{}'",
            operation.http_method(),
            operation.describe(),
            name
        );
    }
}

#[async_trait]
impl<T: TenantApi> TenantApi for DryRunTenant<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_all(
        &self,
        entity: EntityType,
        max_results: usize,
    ) -> Result<Vec<Value>, ApiError> {
        self.inner.fetch_all(entity, max_results).await
    }

    async fn fetch_one(&self, entity: EntityType, id: &str) -> Result<Value, ApiError> {
        self.inner.fetch_one(entity, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        self.inner.query(query).await
    }

    async fn create(&self, entity: EntityType, mut record: Value) -> Result<Value, ApiError> {
        let operation = Operation::create(entity, record.clone());
        self.log_write(&operation);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Some(map) = record.as_object_mut() {
            map.insert("Id".to_string(), Value::String(format!("dry-run-{}", id)));
            map.insert("SyncToken".to_string(), Value::String("0".to_string()));
        }
        Ok(record)
    }

    async fn update(&self, entity: EntityType, record: Value) -> Result<Value, ApiError> {
        let operation = Operation::update(entity, record.clone());
        self.log_write(&operation);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTenant;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_do_not_reach_inner_tenant() {
        let inner = MemoryTenant::new("target");
        inner.seed(EntityType::Class, json!({"Name": "Retail"}));
        let tenant = DryRunTenant::new(inner);

        let created = tenant
            .create(EntityType::Class, json!({"Name": "Wholesale"}))
            .await
            .unwrap();
        assert_eq!(created["Id"], "dry-run-1");
        assert_eq!(tenant.write_count(), 1);

        let all = tenant.fetch_all(EntityType::Class, 1000).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
