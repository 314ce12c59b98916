//! Credentials and migration options
//!
//! One TOML file holds the Intuit app credentials, the `[source]` and
//! `[target]` companies and the `[migration]` options. Refreshed tokens are
//! written back to the same file.

pub mod repository;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::client::DEFAULT_MINOR_VERSION;
use crate::api::models::{Environment, TokenInfo};

pub use repository::id_mappings::IdMappingStore;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "QBO_MIGRATE_CONFIG";
const CONFIG_FILE_NAME: &str = "credentials.toml";
const APP_DIR_NAME: &str = "qbo-migrate";

/// Which side of the migration a company is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyRole {
    Source,
    Target,
}

impl CompanyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyRole::Source => "source",
            CompanyRole::Target => "target",
        }
    }
}

impl fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" => Ok(CompanyRole::Source),
            "target" => Ok(CompanyRole::Target),
            other => Err(format!("Unknown company '{}' (expected source or target)", other)),
        }
    }
}

/// What a pass does when the target catalog cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFailurePolicy {
    /// Fail the pass
    #[default]
    Abort,
    /// Continue with an empty catalog; may cause duplicate-create attempts
    Empty,
}

/// One QuickBooks company and its OAuth tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl CompanyConfig {
    pub fn apply_tokens(&mut self, tokens: &TokenInfo) {
        self.access_token = tokens.access_token.clone();
        self.refresh_token = tokens.refresh_token.clone();
    }

    pub fn is_authorized(&self) -> bool {
        !self.company_id.is_empty() && !self.access_token.is_empty()
    }
}

fn default_id_mapping_file() -> PathBuf {
    PathBuf::from("id_mapping.json")
}

fn default_max_results() -> usize {
    1000
}

fn default_checkpoint_interval() -> usize {
    25
}

fn default_true() -> bool {
    true
}

fn default_minor_version() -> u32 {
    DEFAULT_MINOR_VERSION
}

/// Account names seeded by QuickBooks in every company; never transferred
pub fn default_account_names() -> Vec<String> {
    [
        "Accounts Payable",
        "Accounts Receivable",
        "Opening Balance Equity",
        "Retained Earnings",
        "Sales of Product Income",
        "Undeposited Funds",
        "Inventory Asset",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// `[migration]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    #[serde(default = "default_id_mapping_file")]
    pub id_mapping_file: PathBuf,
    /// Page size for catalog loads
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Persist the id mapping every N processed records (0 disables)
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,
    #[serde(default)]
    pub catalog_failure: CatalogFailurePolicy,
    #[serde(default = "default_true")]
    pub refresh_tokens_on_start: bool,
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,
    /// Name substrings of platform-seeded accounts
    #[serde(default = "default_account_names")]
    pub default_accounts: Vec<String>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            id_mapping_file: default_id_mapping_file(),
            max_results: default_max_results(),
            checkpoint_interval: default_checkpoint_interval(),
            catalog_failure: CatalogFailurePolicy::default(),
            refresh_tokens_on_start: true,
            minor_version: default_minor_version(),
            default_accounts: default_account_names(),
        }
    }
}

/// Whole credentials file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub migration: MigrationOptions,
    #[serde(default)]
    pub source: CompanyConfig,
    #[serde(default)]
    pub target: CompanyConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    /// Load the config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config back (used after token refreshes)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn company(&self, role: CompanyRole) -> &CompanyConfig {
        match role {
            CompanyRole::Source => &self.source,
            CompanyRole::Target => &self.target,
        }
    }

    pub fn company_mut(&mut self, role: CompanyRole) -> &mut CompanyConfig {
        match role {
            CompanyRole::Source => &mut self.source,
            CompanyRole::Target => &mut self.target,
        }
    }

    /// Fail early when the app credentials are missing
    pub fn require_app_credentials(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            anyhow::bail!("client_id and client_secret must be set in the config file");
        }
        Ok(())
    }
}

/// Locate the config file
///
/// Order: explicit path, `QBO_MIGRATE_CONFIG`, `./credentials.toml`, then
/// the platform config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }

    let config_dir = dirs::config_dir().context("Could not determine configuration directory")?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
client_id = "abc"
client_secret = "shh"

[source]
company_id = "111"
access_token = "a"
refresh_token = "r"

[target]
environment = "sandbox"
company_id = "222"
"#,
        )
        .unwrap();

        assert_eq!(config.migration.max_results, 1000);
        assert_eq!(config.migration.checkpoint_interval, 25);
        assert_eq!(config.migration.catalog_failure, CatalogFailurePolicy::Abort);
        assert_eq!(config.migration.minor_version, 65);
        assert!(
            config
                .migration
                .default_accounts
                .contains(&"Retained Earnings".to_string())
        );
        assert_eq!(config.source.environment, Environment::Production);
        assert_eq!(config.target.environment, Environment::Sandbox);
        assert!(config.source.is_authorized());
        assert!(!config.target.is_authorized());
    }

    #[test]
    fn test_migration_overrides() {
        let config = Config::from_toml(
            r#"
[migration]
id_mapping_file = "state/map.json"
catalog_failure = "empty"
checkpoint_interval = 0
default_accounts = ["Payroll Clearing"]
"#,
        )
        .unwrap();
        assert_eq!(config.migration.id_mapping_file, PathBuf::from("state/map.json"));
        assert_eq!(config.migration.catalog_failure, CatalogFailurePolicy::Empty);
        assert_eq!(config.migration.checkpoint_interval, 0);
        assert_eq!(config.migration.default_accounts, vec!["Payroll Clearing"]);
    }

    #[test]
    fn test_save_round_trips_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let mut config = Config::default();
        config.company_mut(CompanyRole::Target).apply_tokens(&TokenInfo {
            access_token: "new-access".to_string(),
            refresh_token: "new-refresh".to_string(),
            expires_in: Some(3600),
            x_refresh_token_expires_in: None,
        });
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.target.access_token, "new-access");
        assert_eq!(loaded.target.refresh_token, "new-refresh");
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_company_role_parse() {
        assert_eq!("Target".parse::<CompanyRole>().unwrap(), CompanyRole::Target);
        assert!("both".parse::<CompanyRole>().is_err());
    }
}
