//! Core Operation types for QuickBooks Online REST calls

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::models::EntityType;

/// A single call that can be executed against a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// Run a query statement
    Query {
        entity: EntityType,
        /// Full query-language text
        query: String,
    },
    /// Read one record by id
    Read { entity: EntityType, id: String },
    /// Create a new record
    Create {
        entity: EntityType,
        /// Record data as JSON
        data: Value,
    },
    /// Full update of an existing record
    ///
    /// QuickBooks updates are POSTs to the collection; the payload must
    /// carry `Id` and the current `SyncToken`.
    Update { entity: EntityType, data: Value },
}

impl Operation {
    pub fn query(entity: EntityType, query: impl Into<String>) -> Self {
        Self::Query {
            entity,
            query: query.into(),
        }
    }

    pub fn read(entity: EntityType, id: impl Into<String>) -> Self {
        Self::Read {
            entity,
            id: id.into(),
        }
    }

    pub fn create(entity: EntityType, data: Value) -> Self {
        Self::Create { entity, data }
    }

    pub fn update(entity: EntityType, data: Value) -> Self {
        Self::Update { entity, data }
    }

    /// Get the entity type for this operation
    pub fn entity(&self) -> EntityType {
        match self {
            Self::Query { entity, .. }
            | Self::Read { entity, .. }
            | Self::Create { entity, .. }
            | Self::Update { entity, .. } => *entity,
        }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::Query { .. } | Self::Read { .. } => "GET",
            Self::Create { .. } | Self::Update { .. } => "POST",
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Query { .. } => "query",
            Self::Read { .. } => "read",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
        }
    }

    /// Path relative to `/v3/company/{realm}/`, without the query string
    pub fn path(&self) -> String {
        match self {
            Self::Query { .. } => "query".to_string(),
            Self::Read { entity, id } => {
                format!("{}/{}", entity.resource(), urlencoding::encode(id))
            }
            Self::Create { entity, .. } | Self::Update { entity, .. } => entity.resource(),
        }
    }

    /// Query-string parameters beyond `minorversion`
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Query { query, .. } => vec![("query", query.clone())],
            Self::Update { .. } => vec![("operation", "update".to_string())],
            _ => Vec::new(),
        }
    }

    /// Request body, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Create { data, .. } | Self::Update { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Short label for log lines, e.g. "create Account" or "read Vendor/12"
    pub fn describe(&self) -> String {
        match self {
            Self::Read { entity, id } => format!("read {}/{}", entity, id),
            other => format!("{} {}", other.operation_type(), other.entity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_path_and_method() {
        let op = Operation::read(EntityType::JournalEntry, "145");
        assert_eq!(op.http_method(), "GET");
        assert_eq!(op.path(), "journalentry/145");
        assert!(op.body().is_none());
    }

    #[test]
    fn test_update_posts_with_operation_param() {
        let op = Operation::update(EntityType::Account, json!({"Id": "1", "SyncToken": "0"}));
        assert_eq!(op.http_method(), "POST");
        assert_eq!(op.path(), "account");
        assert_eq!(op.query_params(), vec![("operation", "update".to_string())]);
        assert!(op.body().is_some());
    }

    #[test]
    fn test_query_carries_statement() {
        let op = Operation::query(EntityType::Class, "SELECT * FROM Class");
        assert_eq!(op.path(), "query");
        assert_eq!(op.describe(), "query Class");
        assert_eq!(
            op.query_params(),
            vec![("query", "SELECT * FROM Class".to_string())]
        );
    }
}
