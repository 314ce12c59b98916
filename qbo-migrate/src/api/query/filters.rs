//! Query predicates

use serde::{Deserialize, Serialize};

/// A literal on the right-hand side of a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    String(String),
    Bool(bool),
    Number(i64),
}

impl FilterValue {
    /// Render as a query-language literal, escaping quotes in strings
    pub fn to_literal(&self) -> String {
        match self {
            FilterValue::String(s) => format!("'{}'", escape(s)),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Number(n) => n.to_string(),
        }
    }

    /// Compare against a JSON field value (used by in-process tenants)
    pub fn matches_json(&self, value: &serde_json::Value) -> bool {
        match (self, value) {
            (FilterValue::String(expected), serde_json::Value::String(actual)) => {
                expected == actual
            }
            (FilterValue::Bool(expected), serde_json::Value::Bool(actual)) => expected == actual,
            (FilterValue::Number(expected), serde_json::Value::Number(actual)) => {
                actual.as_i64() == Some(*expected)
            }
            (FilterValue::Number(expected), serde_json::Value::String(actual)) => {
                actual == &expected.to_string()
            }
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n)
    }
}

/// A single predicate in a WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// `field = value`
    Eq(String, FilterValue),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Render as query-language text
    pub fn to_query_string(&self) -> String {
        match self {
            Filter::Eq(field, value) => format!("{} = {}", field, value.to_literal()),
        }
    }

    /// Evaluate against a JSON record
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        match self {
            Filter::Eq(field, value) => record
                .get(field)
                .map(|actual| value.matches_json(actual))
                .unwrap_or(false),
        }
    }
}

/// QuickBooks escapes apostrophes with a backslash
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
