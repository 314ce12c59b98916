//! Account references: number/name key, then name alone

use super::{ReferenceMapper, mapped_target};
use crate::transfer::types::{Account, AccountKey, Entity, Reference};
use crate::api::tenant::decode;
use crate::config::IdMappingStore;

impl ReferenceMapper<'_> {
    /// Map an account reference; `None` is a hard failure for the line
    pub async fn map_account(
        &self,
        reference: &Reference,
        id_mapping: &IdMappingStore,
    ) -> Option<Reference> {
        let source_account = match self.source.fetch_one(Account::TYPE, &reference.value).await {
            Ok(raw) => decode::<Account>(Account::TYPE, raw)
                .map_err(|err| log::warn!("Source account {}: {}", reference.value, err))
                .ok(),
            Err(err) => {
                log::warn!("Could not read source account {}: {}", reference.value, err);
                None
            }
        };

        let number = source_account
            .as_ref()
            .and_then(|a| a.acct_num.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let mut names: Vec<String> = Vec::new();
        for name in [
            Some(reference.hint()),
            source_account.as_ref().and_then(|a| a.name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        for name in &names {
            let key = AccountKey::numbered(Some(number.as_str()), name);
            if let Some(found) = self.target_accounts.resolve(&key) {
                log::debug!("Account matched by number and name: {}", key);
                return target_reference(found);
            }
        }

        for name in &names {
            if let Some(found) = self.target_accounts.resolve(&AccountKey::name(name)) {
                log::warn!(
                    "Account matched by name only (no matching number): {} (Number: {})",
                    name,
                    number
                );
                return target_reference(found);
            }
        }

        if let Some(found) = mapped_target(
            Account::TYPE,
            &reference.value,
            id_mapping,
            &self.target_accounts,
        ) {
            log::info!(
                "Account {} resolved through id mapping to {}",
                reference,
                found.id().unwrap_or_default()
            );
            return target_reference(found);
        }

        log::error!(
            "Account not found in target company: {} (Number: {}, ID: {})",
            names.first().map(String::as_str).unwrap_or("<unnamed>"),
            number,
            reference.value
        );
        None
    }
}

fn target_reference(account: &Account) -> Option<Reference> {
    Some(Reference::new(account.id()?, account.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTenant;
    use crate::api::models::EntityType;
    use crate::config::CatalogFailurePolicy;
    use serde_json::json;

    async fn mapper_fixture<'a>(
        source: &'a MemoryTenant,
        target: &'a MemoryTenant,
        ids: &mut IdMappingStore,
    ) -> ReferenceMapper<'a> {
        let mut mapper = ReferenceMapper::new(source, target, 1000);
        mapper
            .load_journal_catalogs(CatalogFailurePolicy::Abort, ids)
            .await
            .unwrap();
        mapper
    }

    #[tokio::test]
    async fn test_number_and_name_preferred() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(
            EntityType::Account,
            json!({"Id": "7", "Name": "Checking", "AcctNum": "1010"}),
        );
        target.seed(EntityType::Account, json!({"Name": "Checking", "AcctNum": "9999"}));
        let numbered = target.seed(
            EntityType::Account,
            json!({"Name": "Checking ", "AcctNum": "1010"}),
        );

        let mut ids = IdMappingStore::new();
        let mapper = mapper_fixture(&source, &target, &mut ids).await;
        let mapped = mapper
            .map_account(&Reference::new("7", Some("Checking".into())), &ids)
            .await
            .unwrap();
        assert_eq!(mapped.value, numbered);
    }

    #[tokio::test]
    async fn test_name_only_fallback() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(EntityType::Account, json!({"Id": "7", "Name": "Rent", "AcctNum": "6100"}));
        let rent = target.seed(EntityType::Account, json!({"Name": "Rent"}));

        let mut ids = IdMappingStore::new();
        let mapper = mapper_fixture(&source, &target, &mut ids).await;
        let mapped = mapper
            .map_account(&Reference::new("7", Some("Rent".into())), &ids)
            .await
            .unwrap();
        assert_eq!(mapped.value, rent);
        assert_eq!(mapped.name.as_deref(), Some("Rent"));
    }

    #[tokio::test]
    async fn test_unresolvable_account() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(EntityType::Account, json!({"Id": "7", "Name": "Travel"}));
        target.seed(EntityType::Account, json!({"Name": "Meals"}));

        let mut ids = IdMappingStore::new();
        let mapper = mapper_fixture(&source, &target, &mut ids).await;
        assert!(
            mapper
                .map_account(&Reference::new("7", Some("Travel".into())), &ids)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_mapping_fallback_needs_live_target() {
        let source = MemoryTenant::with_first_id("source", 1);
        let target = MemoryTenant::with_first_id("target", 100);
        source.seed(EntityType::Account, json!({"Id": "7", "Name": "Old Name"}));
        let renamed = target.seed(EntityType::Account, json!({"Name": "New Name"}));

        let mut ids = IdMappingStore::new();
        let mapper = mapper_fixture(&source, &target, &mut ids).await;
        ids.record(EntityType::Account, "7", &renamed);
        let mapped = mapper
            .map_account(&Reference::new("7", Some("Old Name".into())), &ids)
            .await
            .unwrap();
        assert_eq!(mapped.value, renamed);

        ids.record(EntityType::Account, "7", "deleted-id");
        assert!(
            mapper
                .map_account(&Reference::new("7", Some("Old Name".into())), &ids)
                .await
                .is_none()
        );
    }
}
