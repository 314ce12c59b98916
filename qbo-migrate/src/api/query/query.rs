//! Reusable query statement

use serde::{Deserialize, Serialize};

use super::filters::Filter;
use crate::api::models::EntityType;

/// A `SELECT * FROM` statement against one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub entity: EntityType,
    pub filters: Vec<Filter>,
    pub start_position: Option<usize>,
    pub max_results: Option<usize>,
}

impl Query {
    /// Select every record of an entity type
    pub fn new(entity: EntityType) -> Self {
        Query {
            entity,
            filters: Vec::new(),
            start_position: None,
            max_results: None,
        }
    }

    /// Add a predicate (predicates are ANDed)
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Select one page starting at a 1-based position
    pub fn page(mut self, start_position: usize, max_results: usize) -> Self {
        self.start_position = Some(start_position.max(1));
        self.max_results = Some(max_results);
        self
    }

    /// Render as query-language text
    pub fn to_query_string(&self) -> String {
        let mut query = format!("SELECT * FROM {}", self.entity.as_str());

        if !self.filters.is_empty() {
            let predicates: Vec<String> = self.filters.iter().map(|f| f.to_query_string()).collect();
            query.push_str(" WHERE ");
            query.push_str(&predicates.join(" AND "));
        }

        if let Some(start) = self.start_position {
            query.push_str(&format!(" STARTPOSITION {}", start));
        }
        if let Some(max) = self.max_results {
            query.push_str(&format!(" MAXRESULTS {}", max));
        }

        query
    }

    /// Evaluate the predicates against a JSON record
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all() {
        let query = Query::new(EntityType::Class);
        assert_eq!(query.to_query_string(), "SELECT * FROM Class");
    }

    #[test]
    fn test_paged_select() {
        let query = Query::new(EntityType::JournalEntry).page(1001, 1000);
        assert_eq!(
            query.to_query_string(),
            "SELECT * FROM JournalEntry STARTPOSITION 1001 MAXRESULTS 1000"
        );
    }

    #[test]
    fn test_filtered_select() {
        let query = Query::new(EntityType::Vendor)
            .filter(Filter::eq("DisplayName", "Acme"))
            .filter(Filter::eq("Active", true));
        assert_eq!(
            query.to_query_string(),
            "SELECT * FROM Vendor WHERE DisplayName = 'Acme' AND Active = true"
        );
    }
}
