//! QuickBooks Online API models shared by the client, auth and transfer layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity types the tenant API exposes to the migration engine
///
/// The first six are transferred; `TaxCode` and `Department` are lookup-only
/// lists used to map tenant-local references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Account,
    Employee,
    Customer,
    Class,
    Vendor,
    JournalEntry,
    TaxCode,
    Department,
}

impl EntityType {
    /// Transfer order of the pipeline: each pass feeds the id mapping of later ones
    pub const PIPELINE: [EntityType; 6] = [
        EntityType::Account,
        EntityType::Employee,
        EntityType::Customer,
        EntityType::Class,
        EntityType::Vendor,
        EntityType::JournalEntry,
    ];

    /// Name used in queries and response envelopes (e.g. "JournalEntry")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Account => "Account",
            EntityType::Employee => "Employee",
            EntityType::Customer => "Customer",
            EntityType::Class => "Class",
            EntityType::Vendor => "Vendor",
            EntityType::JournalEntry => "JournalEntry",
            EntityType::TaxCode => "TaxCode",
            EntityType::Department => "Department",
        }
    }

    /// Lowercase resource segment used in REST paths (e.g. "journalentry")
    pub fn resource(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Plural label for log and summary output
    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityType::Account => "accounts",
            EntityType::Employee => "employees",
            EntityType::Customer => "customers",
            EntityType::Class => "classes",
            EntityType::Vendor => "vendors",
            EntityType::JournalEntry => "journal entries",
            EntityType::TaxCode => "tax codes",
            EntityType::Department => "departments",
        }
    }

    /// Whether this type has its own transfer pass
    pub fn is_transferable(&self) -> bool {
        Self::PIPELINE.contains(self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "account" | "accounts" => Ok(EntityType::Account),
            "employee" | "employees" => Ok(EntityType::Employee),
            "customer" | "customers" => Ok(EntityType::Customer),
            "class" | "classes" => Ok(EntityType::Class),
            "vendor" | "vendors" => Ok(EntityType::Vendor),
            "journalentry" | "journalentries" | "journal" | "journals" => {
                Ok(EntityType::JournalEntry)
            }
            "taxcode" | "taxcodes" => Ok(EntityType::TaxCode),
            "department" | "departments" => Ok(EntityType::Department),
            _ => Err(format!("Unknown entity type '{}'", s)),
        }
    }
}

/// QuickBooks environment a company lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    #[default]
    Production,
}

impl Environment {
    /// Accounting API base URL for this environment
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox-quickbooks.api.intuit.com",
            Environment::Production => "https://quickbooks.api.intuit.com",
        }
    }
}

/// Token pair returned by the Intuit OAuth2 token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token lifetime in seconds
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<u64>,
}
