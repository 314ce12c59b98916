//! Typed QuickBooks records
//!
//! Each struct holds the fields the migration reads or copies; anything
//! else on the wire (balances, metadata, ...) is ignored on decode. Every
//! field is optional so "copy if present" is a plain `Option` clone.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::Hash;

use super::keys::{AccountKey, non_blank, path_prefixes};
use super::reference::Reference;
use crate::api::models::EntityType;

/// A record type the catalog can index
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TYPE: EntityType;
    type Key: Eq + Hash + Clone + fmt::Display + fmt::Debug + Send + Sync;

    /// Tenant-assigned id
    fn id(&self) -> Option<&str>;

    /// Primary matching key; `None` when the record cannot be matched by name
    fn display_key(&self) -> Option<Self::Key>;

    /// Secondary keys that only fill otherwise empty catalog slots
    fn alias_keys(&self) -> Vec<Self::Key> {
        Vec::new()
    }

    fn is_active(&self) -> bool;

    /// Human label for logs
    fn label(&self) -> String {
        match (self.display_key(), self.id()) {
            (Some(key), _) => key.to_string(),
            (None, Some(id)) => format!("<unnamed {} {}>", Self::TYPE, id),
            (None, None) => format!("<unnamed {}>", Self::TYPE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Account {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub name: Option<String>,
    pub account_type: Option<String>,
    pub acct_num: Option<String>,
    pub account_sub_type: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub classification: Option<String>,
    pub sub_account: Option<bool>,
    pub parent_ref: Option<Reference>,
    pub currency_ref: Option<Reference>,
    pub exchange_rate: Option<f64>,
    pub tax_code_ref: Option<Reference>,
    pub account_alias: Option<String>,
    pub fully_qualified_name: Option<String>,
    pub txn_location_type: Option<String>,
}

impl Entity for Account {
    const TYPE: EntityType = EntityType::Account;
    type Key = AccountKey;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<AccountKey> {
        non_blank(self.name.as_deref()).map(AccountKey::name)
    }

    fn alias_keys(&self) -> Vec<AccountKey> {
        non_blank(self.name.as_deref())
            .map(|name| vec![AccountKey::numbered(self.acct_num.as_deref(), name)])
            .unwrap_or_default()
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Class {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub name: Option<String>,
    pub sub_class: Option<bool>,
    pub active: Option<bool>,
    pub division: Option<bool>,
    pub fully_qualified_name: Option<String>,
    pub parent_ref: Option<Reference>,
}

impl Class {
    /// Full path, falling back to the plain name for top-level classes
    pub fn path(&self) -> Option<&str> {
        non_blank(self.fully_qualified_name.as_deref()).or_else(|| non_blank(self.name.as_deref()))
    }
}

impl Entity for Class {
    const TYPE: EntityType = EntityType::Class;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        self.path().map(|p| p.to_string())
    }

    /// Every partial path prefix; the leaf name is not a key
    fn alias_keys(&self) -> Vec<String> {
        self.path().map(path_prefixes).unwrap_or_default()
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Customer {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub suffix: Option<String>,
    pub company_name: Option<String>,
    pub active: Option<bool>,
    pub primary_phone: Option<Value>,
    pub alternate_phone: Option<Value>,
    pub mobile: Option<Value>,
    pub fax: Option<Value>,
    pub primary_email_addr: Option<Value>,
    pub web_addr: Option<Value>,
    pub bill_addr: Option<Value>,
    pub ship_addr: Option<Value>,
    pub notes: Option<String>,
    pub balance: Option<f64>,
    pub open_balance_date: Option<String>,
    pub balance_with_jobs: Option<f64>,
    pub preferred_delivery_method: Option<String>,
    pub resale_num: Option<String>,
    pub job: Option<bool>,
    pub print_on_check_name: Option<String>,
    pub default_tax_code_ref: Option<Reference>,
    pub currency_ref: Option<Reference>,
}

impl Entity for Customer {
    const TYPE: EntityType = EntityType::Customer;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        non_blank(self.display_name.as_deref()).map(|s| s.to_string())
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Vendor {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub suffix: Option<String>,
    pub company_name: Option<String>,
    pub active: Option<bool>,
    pub primary_phone: Option<Value>,
    pub alternate_phone: Option<Value>,
    pub mobile: Option<Value>,
    pub fax: Option<Value>,
    pub primary_email_addr: Option<Value>,
    pub web_addr: Option<Value>,
    pub bill_addr: Option<Value>,
    pub ship_addr: Option<Value>,
    pub other_addr: Option<Value>,
    pub notes: Option<String>,
    pub balance: Option<f64>,
    pub open_balance_date: Option<String>,
    pub vendor_payment_bank_detail: Option<Value>,
    pub tax_identifier: Option<String>,
    pub acct_num: Option<String>,
    pub print_on_check_name: Option<String>,
    pub default_tax_code_ref: Option<Reference>,
    pub currency_ref: Option<Reference>,
    pub vendor_type: Option<String>,
    #[serde(rename = "T4AEligible")]
    pub t4a_eligible: Option<bool>,
    #[serde(rename = "T5018Eligible")]
    pub t5018_eligible: Option<bool>,
}

impl Entity for Vendor {
    const TYPE: EntityType = EntityType::Vendor;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        non_blank(self.display_name.as_deref()).map(|s| s.to_string())
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Employee {
    pub id: Option<String>,
    pub sync_token: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub title: Option<String>,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,
    pub display_name: Option<String>,
    pub print_on_check_name: Option<String>,
    pub active: Option<bool>,
    pub primary_phone: Option<Value>,
    pub mobile: Option<Value>,
    pub primary_email_addr: Option<Value>,
    pub billable_time: Option<bool>,
    pub bill_rate: Option<f64>,
    #[serde(rename = "SSN")]
    pub ssn: Option<String>,
    pub employee_number: Option<String>,
    pub hired_date: Option<String>,
    pub released_date: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub organization: Option<bool>,
    pub primary_addr: Option<Value>,
    pub other_addr: Option<Value>,
}

impl Employee {
    /// "GivenName FamilyName", trimmed
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.given_name.as_deref().unwrap_or_default().trim(),
            self.family_name.as_deref().unwrap_or_default().trim()
        )
        .trim()
        .to_string()
    }
}

impl Entity for Employee {
    const TYPE: EntityType = EntityType::Employee;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        Some(self.full_name()).filter(|n| !n.is_empty())
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

/// Tax code, looked up by name only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaxCode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl Entity for TaxCode {
    const TYPE: EntityType = EntityType::TaxCode;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        non_blank(self.name.as_deref()).map(|s| s.to_string())
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// Department (location), looked up by path or name only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Department {
    pub id: Option<String>,
    pub name: Option<String>,
    pub fully_qualified_name: Option<String>,
    pub active: Option<bool>,
}

impl Entity for Department {
    const TYPE: EntityType = EntityType::Department;
    type Key = String;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_key(&self) -> Option<String> {
        non_blank(self.fully_qualified_name.as_deref())
            .or_else(|| non_blank(self.name.as_deref()))
            .map(|s| s.to_string())
    }

    fn alias_keys(&self) -> Vec<String> {
        non_blank(self.name.as_deref())
            .map(|n| vec![n.to_string()])
            .unwrap_or_default()
    }

    fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_decodes_wire_record() {
        let account: Account = serde_json::from_value(json!({
            "Id": "33",
            "SyncToken": "0",
            "Name": "Checking",
            "AcctNum": "1000",
            "AccountType": "Bank",
            "CurrentBalance": 1201.0,
            "MetaData": {"CreateTime": "2024-01-01T00:00:00-08:00"}
        }))
        .unwrap();
        assert_eq!(account.id(), Some("33"));
        assert_eq!(account.display_key(), Some(AccountKey::name("Checking")));
        assert_eq!(
            account.alias_keys(),
            vec![AccountKey::numbered(Some("1000"), "Checking")]
        );
        // Missing Active means inactive for accounts
        assert!(!account.is_active());
    }

    #[test]
    fn test_active_defaults_by_type() {
        assert!(!Employee::default().is_active());
        assert!(Customer::default().is_active());
        assert!(Vendor::default().is_active());
        assert!(Class::default().is_active());
    }

    #[test]
    fn test_employee_key_is_full_name() {
        let employee = Employee {
            given_name: Some(" Emily ".into()),
            family_name: Some("Platt".into()),
            ..Default::default()
        };
        assert_eq!(employee.display_key().as_deref(), Some("Emily Platt"));
        assert_eq!(Employee::default().display_key(), None);
    }

    #[test]
    fn test_class_aliases_cover_prefixes() {
        let class = Class {
            name: Some("C".into()),
            fully_qualified_name: Some("A:B:C".into()),
            ..Default::default()
        };
        assert_eq!(class.display_key().as_deref(), Some("A:B:C"));
        assert_eq!(class.alias_keys(), vec!["A", "A:B", "A:B:C"]);
    }

    #[test]
    fn test_nested_class_does_not_claim_leaf_name() {
        let nested = Class {
            id: Some("40".into()),
            name: Some("Region".into()),
            fully_qualified_name: Some("Global:Region".into()),
            ..Default::default()
        };
        let catalog = crate::transfer::catalog::Catalog::build(vec![nested]);
        assert!(catalog.exists(&"Global:Region".to_string()));
        assert!(catalog.exists(&"Global".to_string()));
        assert!(!catalog.exists(&"Region".to_string()));
    }

    #[test]
    fn test_vendor_irregular_field_names() {
        let vendor: Vendor = serde_json::from_value(json!({
            "DisplayName": "Acme",
            "T4AEligible": true,
            "T5018Eligible": false
        }))
        .unwrap();
        assert_eq!(vendor.t4a_eligible, Some(true));
        assert_eq!(vendor.t5018_eligible, Some(false));
    }
}
