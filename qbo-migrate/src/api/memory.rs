//! In-memory tenant used by tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use super::error::ApiError;
use super::models::EntityType;
use super::query::Query;
use super::tenant::TenantApi;

#[derive(Default)]
struct State {
    records: HashMap<EntityType, Vec<Value>>,
    next_id: usize,
    failing_fetch_all: HashSet<EntityType>,
    create_errors: HashMap<EntityType, VecDeque<ApiError>>,
    creates: HashMap<EntityType, usize>,
    updates: HashMap<EntityType, usize>,
    queries: usize,
}

/// Tenant with sequential ids, `field = value` queries and full-replacement updates
pub struct MemoryTenant {
    name: String,
    state: Mutex<State>,
}

impl MemoryTenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_first_id(name, 1)
    }

    /// Start id assignment at `first_id` so two tenants never share ids
    pub fn with_first_id(name: impl Into<String>, first_id: usize) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State {
                next_id: first_id,
                ..State::default()
            }),
        }
    }

    /// Insert a record directly, assigning an id when it has none
    pub fn seed(&self, entity: EntityType, mut record: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let id = match record.get("Id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => {
                let id = state.next_id.to_string();
                state.next_id += 1;
                id
            }
        };
        if let Some(map) = record.as_object_mut() {
            map.insert("Id".to_string(), Value::String(id.clone()));
            map.entry("SyncToken")
                .or_insert_with(|| Value::String("0".to_string()));
        }
        state.records.entry(entity).or_default().push(record);
        id
    }

    pub fn records(&self, entity: EntityType) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.records.get(&entity).cloned().unwrap_or_default()
    }

    /// First record whose `field` equals `value`
    pub fn find(&self, entity: EntityType, field: &str, value: &str) -> Option<Value> {
        self.records(entity)
            .into_iter()
            .find(|r| r.get(field).and_then(|v| v.as_str()) == Some(value))
    }

    pub fn fail_fetch_all(&self, entity: EntityType) {
        self.state.lock().unwrap().failing_fetch_all.insert(entity);
    }

    /// Queue an error for the next create of this type
    pub fn fail_next_create(&self, entity: EntityType, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .create_errors
            .entry(entity)
            .or_default()
            .push_back(error);
    }

    pub fn create_count(&self, entity: EntityType) -> usize {
        *self.state.lock().unwrap().creates.get(&entity).unwrap_or(&0)
    }

    pub fn update_count(&self, entity: EntityType) -> usize {
        *self.state.lock().unwrap().updates.get(&entity).unwrap_or(&0)
    }

    pub fn query_count(&self) -> usize {
        self.state.lock().unwrap().queries
    }
}

/// `Parent:Name` path the way QuickBooks derives it on create
fn qualified_name(existing: Option<&Vec<Value>>, record: &Value) -> Option<String> {
    let name = record.get("Name")?.as_str()?;
    let parent_id = record
        .get("ParentRef")
        .and_then(|p| p.get("value"))
        .and_then(|v| v.as_str());
    let Some(parent_id) = parent_id else {
        return Some(name.to_string());
    };
    let parent = existing?
        .iter()
        .find(|r| r.get("Id").and_then(|v| v.as_str()) == Some(parent_id))?;
    let parent_path = parent
        .get("FullyQualifiedName")
        .or_else(|| parent.get("Name"))?
        .as_str()?;
    Some(format!("{}:{}", parent_path, name))
}

#[async_trait]
impl TenantApi for MemoryTenant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(
        &self,
        entity: EntityType,
        _max_results: usize,
    ) -> Result<Vec<Value>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.failing_fetch_all.contains(&entity) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(state.records.get(&entity).cloned().unwrap_or_default())
    }

    async fn fetch_one(&self, entity: EntityType, id: &str) -> Result<Value, ApiError> {
        let state = self.state.lock().unwrap();
        state
            .records
            .get(&entity)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| r.get("Id").and_then(|v| v.as_str()) == Some(id))
            })
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                entity,
                id: id.to_string(),
            })
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.queries += 1;
        Ok(state
            .records
            .get(&query.entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| query.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, entity: EntityType, mut record: Value) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state
            .create_errors
            .get_mut(&entity)
            .and_then(|q| q.pop_front())
        {
            return Err(err);
        }
        let id = state.next_id.to_string();
        state.next_id += 1;
        let qualified = match entity {
            EntityType::Account | EntityType::Class => {
                qualified_name(state.records.get(&entity), &record)
            }
            _ => None,
        };
        if let Some(map) = record.as_object_mut() {
            map.insert("Id".to_string(), Value::String(id));
            map.insert("SyncToken".to_string(), Value::String("0".to_string()));
            if let Some(qualified) = qualified {
                map.entry("FullyQualifiedName")
                    .or_insert(Value::String(qualified));
            }
        }
        *state.creates.entry(entity).or_default() += 1;
        state.records.entry(entity).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, entity: EntityType, mut record: Value) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        let id = record
            .get("Id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::fault("Update requires Id", Some("2020".into()), None))?;

        let slot = state
            .records
            .get_mut(&entity)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| r.get("Id").and_then(|v| v.as_str()) == Some(id.as_str()))
            })
            .ok_or_else(|| ApiError::NotFound {
                entity,
                id: id.clone(),
            })?;

        let next_token = slot
            .get("SyncToken")
            .and_then(|v| v.as_str())
            .and_then(|t| t.parse::<u64>().ok())
            .map(|t| t + 1)
            .unwrap_or(1);
        if let Some(map) = record.as_object_mut() {
            map.insert(
                "SyncToken".to_string(),
                Value::String(next_token.to_string()),
            );
        }
        *slot = record.clone();
        *state.updates.entry(entity).or_default() += 1;
        Ok(record)
    }
}
