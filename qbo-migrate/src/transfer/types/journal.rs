//! Journal entries and their lines

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::{JournalKey, non_blank};
use super::records::Entity;
use super::reference::{LineEntity, Reference};
use crate::api::models::EntityType;

/// Detail type of every journal line
pub const JOURNAL_LINE_DETAIL: &str = "JournalEntryLineDetail";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JournalEntry {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub txn_date: Option<String>,
    pub doc_number: Option<String>,
    pub private_note: Option<String>,
    pub txn_tax_detail: Option<Value>,
    pub exchange_rate: Option<f64>,
    pub currency_ref: Option<Reference>,
    pub department_ref: Option<Reference>,
    pub txn_status: Option<String>,
    pub line: Vec<JournalLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JournalLine {
    pub id: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub detail_type: Option<String>,
    pub journal_entry_line_detail: Option<JournalLineDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JournalLineDetail {
    pub posting_type: Option<String>,
    pub account_ref: Option<Reference>,
    pub class_ref: Option<Reference>,
    pub entity: Option<LineEntity>,
    pub tax_code_ref: Option<Reference>,
    pub department_ref: Option<Reference>,
    pub tax_applicable_on: Option<String>,
    pub tax_amount: Option<f64>,
    pub billable_status: Option<String>,
}

impl JournalEntry {
    pub fn key(&self) -> JournalKey {
        self.dated_key("")
    }

    /// Key with `default_date` standing in for a missing transaction date
    pub fn dated_key(&self, default_date: &str) -> JournalKey {
        JournalKey::new(
            non_blank(self.txn_date.as_deref()).unwrap_or(default_date),
            self.doc_number.as_deref().unwrap_or_default(),
        )
    }
}

impl Entity for JournalEntry {
    const TYPE: EntityType = EntityType::JournalEntry;
    type Key = JournalKey;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<JournalKey> {
        Some(self.key())
    }

    fn is_active(&self) -> bool {
        true
    }
}
