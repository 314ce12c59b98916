//! QuickBooks Online v3 REST client
//!
//! Implements [`TenantApi`] for one company. Every request carries the
//! bearer token and `minorversion`; faults are decoded into [`ApiError`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::error::ApiError;
use super::models::{EntityType, Environment};
use super::operations::Operation;
use super::query::Query;
use super::tenant::{TenantApi, strip_nulls};

/// Default minor version of the accounting API
pub const DEFAULT_MINOR_VERSION: u32 = 65;

/// Upper bound QuickBooks accepts for MAXRESULTS
const MAX_PAGE_SIZE: usize = 1000;

/// Client bound to one company (realm)
#[derive(Clone)]
pub struct QuickBooksClient {
    name: String,
    base_url: String,
    company_id: String,
    access_token: String,
    minor_version: u32,
    http_client: Client,
}

impl QuickBooksClient {
    pub fn new(
        name: impl Into<String>,
        environment: Environment,
        company_id: impl Into<String>,
        access_token: impl Into<String>,
        minor_version: u32,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: environment.api_base_url().to_string(),
            company_id: company_id.into(),
            access_token: access_token.into(),
            minor_version,
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn url_for(&self, operation: &Operation) -> String {
        format!(
            "{}/v3/company/{}/{}",
            self.base_url,
            self.company_id,
            operation.path()
        )
    }

    /// Execute one operation and unwrap the response envelope
    pub async fn execute(&self, operation: Operation) -> Result<Value, ApiError> {
        let url = self.url_for(&operation);
        let mut params = operation.query_params();
        params.push(("minorversion", self.minor_version.to_string()));

        log::debug!("{} {} ({})", operation.http_method(), url, operation.describe());

        let request = match operation.http_method() {
            "GET" => self.http_client.get(&url),
            _ => self.http_client.post(&url),
        }
        .bearer_auth(&self.access_token)
        .header("Accept", "application/json")
        .query(&params);

        let request = match operation.body() {
            Some(body) => request.json(&strip_nulls(body.clone())),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let intuit_tid = response
            .headers()
            .get("intuit_tid")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &text, intuit_tid);
            return Err(match &operation {
                Operation::Read { entity, id } => err.into_not_found(*entity, id),
                _ => err,
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("{}: {}", operation.describe(), e)))?;

        // A 200 can still carry a Fault envelope
        if body.get("Fault").is_some() {
            let err = ApiError::from_response(status.as_u16(), &text, intuit_tid);
            return Err(match &operation {
                Operation::Read { entity, id } => err.into_not_found(*entity, id),
                _ => err,
            });
        }

        log::debug!(
            "{} -> {} (intuit_tid {})",
            operation.describe(),
            status.as_u16(),
            intuit_tid.as_deref().unwrap_or("-")
        );
        Ok(unwrap_envelope(&operation, body))
    }
}

/// Pull the record (or record list) out of the QuickBooks response wrapper
fn unwrap_envelope(operation: &Operation, mut body: Value) -> Value {
    let entity = operation.entity();
    match operation {
        Operation::Query { .. } => body
            .get_mut("QueryResponse")
            .and_then(|qr| qr.get_mut(entity.as_str()))
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new())),
        _ => match body.get_mut(entity.as_str()) {
            Some(record) => record.take(),
            None => body,
        },
    }
}

fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

#[async_trait]
impl TenantApi for QuickBooksClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(
        &self,
        entity: EntityType,
        max_results: usize,
    ) -> Result<Vec<Value>, ApiError> {
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE);
        let mut records = Vec::new();
        let mut start_position = 1;

        loop {
            let query = Query::new(entity).page(start_position, page_size);
            let page = into_records(
                self.execute(Operation::query(entity, query.to_query_string()))
                    .await?,
            );
            let fetched = page.len();
            records.extend(page);
            log::debug!(
                "{}: fetched {} {} (total {})",
                self.name,
                fetched,
                entity.plural_label(),
                records.len()
            );

            if fetched < page_size {
                break;
            }
            start_position += page_size;
        }

        Ok(records)
    }

    async fn fetch_one(&self, entity: EntityType, id: &str) -> Result<Value, ApiError> {
        self.execute(Operation::read(entity, id)).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let data = self
            .execute(Operation::query(query.entity, query.to_query_string()))
            .await?;
        Ok(into_records(data))
    }

    async fn create(&self, entity: EntityType, record: Value) -> Result<Value, ApiError> {
        self.execute(Operation::create(entity, record)).await
    }

    async fn update(&self, entity: EntityType, record: Value) -> Result<Value, ApiError> {
        self.execute(Operation::update(entity, record)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_query_envelope() {
        let op = Operation::query(EntityType::Class, "SELECT * FROM Class");
        let body = json!({
            "QueryResponse": {"Class": [{"Id": "1"}, {"Id": "2"}], "startPosition": 1},
            "time": "2024-01-01T00:00:00Z"
        });
        assert_eq!(
            unwrap_envelope(&op, body),
            json!([{"Id": "1"}, {"Id": "2"}])
        );
    }

    #[test]
    fn test_unwrap_empty_query_response() {
        let op = Operation::query(EntityType::Vendor, "SELECT * FROM Vendor");
        let records = into_records(unwrap_envelope(&op, json!({"QueryResponse": {}})));
        assert!(records.is_empty());
    }

    #[test]
    fn test_unwrap_single_record() {
        let op = Operation::create(EntityType::Account, json!({"Name": "Cash"}));
        let body = json!({"Account": {"Id": "9", "Name": "Cash"}, "time": "x"});
        assert_eq!(
            unwrap_envelope(&op, body),
            json!({"Id": "9", "Name": "Cash"})
        );
    }

    #[test]
    fn test_unwrap_update_returns_record() {
        let op = Operation::update(EntityType::JournalEntry, json!({"Id": "145", "SyncToken": "1"}));
        let body = json!({"JournalEntry": {"Id": "145", "SyncToken": "2"}, "time": "x"});
        assert_eq!(
            unwrap_envelope(&op, body),
            json!({"Id": "145", "SyncToken": "2"})
        );
    }

    #[test]
    fn test_url_layout() {
        let client = QuickBooksClient::new(
            "target",
            Environment::Sandbox,
            "4620816365",
            "token",
            DEFAULT_MINOR_VERSION,
        );
        let url = client.url_for(&Operation::read(EntityType::Account, "12"));
        assert_eq!(
            url,
            "https://sandbox-quickbooks.api.intuit.com/v3/company/4620816365/account/12"
        );
    }
}
