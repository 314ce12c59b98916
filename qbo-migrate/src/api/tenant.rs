//! Tenant collaborator surface consumed by the transfer engine

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::models::EntityType;
use super::query::Query;

/// One QuickBooks company the engine reads from or writes to
///
/// Every call is a single round trip; the engine awaits each one before
/// issuing the next.
#[async_trait]
pub trait TenantApi: Send + Sync {
    /// Label for logs ("source", "target", ...)
    fn name(&self) -> &str;

    /// Every record of a type, paginated transparently
    async fn fetch_all(&self, entity: EntityType, max_results: usize)
    -> Result<Vec<Value>, ApiError>;

    /// One record by id; `ApiError::NotFound` when absent
    async fn fetch_one(&self, entity: EntityType, id: &str) -> Result<Value, ApiError>;

    /// Records matching a filtered query
    async fn query(&self, query: &Query) -> Result<Vec<Value>, ApiError>;

    /// Create a record, returning it with its tenant-assigned `Id`
    async fn create(&self, entity: EntityType, record: Value) -> Result<Value, ApiError>;

    /// Full update of a record carrying `Id` and `SyncToken`
    async fn update(&self, entity: EntityType, record: Value) -> Result<Value, ApiError>;
}

/// Decode one raw record into its typed form
pub fn decode<E: DeserializeOwned>(entity: EntityType, record: Value) -> Result<E, ApiError> {
    serde_json::from_value(record)
        .map_err(|e| ApiError::Decode(format!("{} record: {}", entity, e)))
}

/// Decode a list of raw records, stopping at the first malformed one
pub fn decode_all<E: DeserializeOwned>(
    entity: EntityType,
    records: Vec<Value>,
) -> Result<Vec<E>, ApiError> {
    records.into_iter().map(|r| decode(entity, r)).collect()
}

/// Drop null members recursively so optional fields are omitted from payloads
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_nulls_nested() {
        let value = json!({
            "Name": "Cash",
            "ParentRef": null,
            "Line": [{"Amount": 10.0, "Description": null}]
        });
        assert_eq!(
            strip_nulls(value),
            json!({"Name": "Cash", "Line": [{"Amount": 10.0}]})
        );
    }

    #[test]
    fn test_decode_reports_entity() {
        let err = decode::<Vec<String>>(EntityType::Vendor, json!({"Id": "1"})).unwrap_err();
        assert!(err.to_string().contains("Vendor record"));
    }
}
