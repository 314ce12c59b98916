//! Attribute copier
//!
//! Builds the target-bound record for each type from a fixed whitelist of
//! source fields. Absent fields stay absent. Reference fields go through the
//! [`ReferenceMapper`] and are dropped when they do not map.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use super::catalog::Catalog;
use super::mapper::{ReferenceMapper, map_parent};
use super::types::{
    Account, Class, Customer, Employee, Entity, JOURNAL_LINE_DETAIL, JournalEntry, JournalLine,
    JournalLineDetail, Reference, Vendor, parent_path,
};
use crate::api::tenant::strip_nulls;
use crate::config::IdMappingStore;

/// JSON payload for a create or update, without null members
pub fn to_payload<E: Serialize>(record: &E) -> Result<Value> {
    let value = serde_json::to_value(record).context("Failed to serialize record")?;
    Ok(strip_nulls(value))
}

async fn map_optional_tax_code(
    mapper: &mut ReferenceMapper<'_>,
    reference: Option<&Reference>,
) -> Option<Reference> {
    match reference {
        Some(r) => mapper.map_tax_code(r).await,
        None => None,
    }
}

pub async fn copy_account(
    source: &Account,
    mapper: &mut ReferenceMapper<'_>,
    id_mapping: &IdMappingStore,
    target: &Catalog<Account>,
) -> Account {
    let parent_ref = source
        .parent_ref
        .as_ref()
        .and_then(|p| map_parent(p, id_mapping, target));
    if let (Some(parent), None) = (source.parent_ref.as_ref(), parent_ref.as_ref()) {
        log::warn!(
            "Parent {} of account {} not found in target company, creating it as a top-level account",
            parent,
            source.label()
        );
    }

    Account {
        id: None,
        sync_token: None,
        name: source.name.clone(),
        account_type: source.account_type.clone(),
        acct_num: source.acct_num.clone(),
        account_sub_type: source.account_sub_type.clone(),
        description: source.description.clone(),
        active: source.active,
        classification: source.classification.clone(),
        // SubAccount without a ParentRef is rejected
        sub_account: parent_ref.as_ref().and(source.sub_account),
        parent_ref,
        currency_ref: source
            .currency_ref
            .as_ref()
            .and_then(|c| mapper.map_currency(c)),
        exchange_rate: source.exchange_rate,
        tax_code_ref: map_optional_tax_code(mapper, source.tax_code_ref.as_ref()).await,
        account_alias: source.account_alias.clone(),
        fully_qualified_name: None,
        txn_location_type: source.txn_location_type.clone(),
    }
}

/// Class copy; the parent resolves through the mapping, then by parent path
pub fn copy_class(source: &Class, id_mapping: &IdMappingStore, target: &Catalog<Class>) -> Class {
    let by_mapping = source
        .parent_ref
        .as_ref()
        .and_then(|p| id_mapping.get(Class::TYPE, &p.value))
        .and_then(|id| target.find_by_id(id));

    let parent = by_mapping.or_else(|| {
        source
            .path()
            .and_then(parent_path)
            .and_then(|path| target.resolve(&path))
    });

    let parent_ref = parent.and_then(|p| {
        Some(Reference::new(
            p.id.clone()?,
            p.fully_qualified_name.clone().or_else(|| p.name.clone()),
        ))
    });

    if parent_ref.is_none() && source.path().and_then(parent_path).is_some() {
        log::warn!(
            "Parent of class {} not found in target company, creating it as a top-level class",
            source.path().unwrap_or_default()
        );
    }

    Class {
        id: None,
        sync_token: None,
        name: source.name.clone(),
        sub_class: parent_ref.as_ref().map(|_| true),
        active: source.active,
        division: source.division,
        // Computed by QuickBooks from Name and ParentRef
        fully_qualified_name: None,
        parent_ref,
    }
}

pub async fn copy_customer(source: &Customer, mapper: &mut ReferenceMapper<'_>) -> Customer {
    Customer {
        id: None,
        sync_token: None,
        display_name: source.display_name.clone(),
        title: source.title.clone(),
        given_name: source.given_name.clone(),
        middle_name: source.middle_name.clone(),
        family_name: source.family_name.clone(),
        suffix: source.suffix.clone(),
        company_name: source.company_name.clone(),
        active: source.active,
        primary_phone: source.primary_phone.clone(),
        alternate_phone: source.alternate_phone.clone(),
        mobile: source.mobile.clone(),
        fax: source.fax.clone(),
        primary_email_addr: source.primary_email_addr.clone(),
        web_addr: source.web_addr.clone(),
        bill_addr: source.bill_addr.clone(),
        ship_addr: source.ship_addr.clone(),
        notes: source.notes.clone(),
        balance: source.balance,
        open_balance_date: source.open_balance_date.clone(),
        balance_with_jobs: source.balance_with_jobs,
        preferred_delivery_method: source.preferred_delivery_method.clone(),
        resale_num: source.resale_num.clone(),
        job: source.job,
        print_on_check_name: source.print_on_check_name.clone(),
        default_tax_code_ref: map_optional_tax_code(mapper, source.default_tax_code_ref.as_ref())
            .await,
        currency_ref: source
            .currency_ref
            .as_ref()
            .and_then(|c| mapper.map_currency(c)),
    }
}

pub async fn copy_vendor(source: &Vendor, mapper: &mut ReferenceMapper<'_>) -> Vendor {
    Vendor {
        id: None,
        sync_token: None,
        display_name: source.display_name.clone(),
        title: source.title.clone(),
        given_name: source.given_name.clone(),
        middle_name: source.middle_name.clone(),
        family_name: source.family_name.clone(),
        suffix: source.suffix.clone(),
        company_name: source.company_name.clone(),
        active: source.active,
        primary_phone: source.primary_phone.clone(),
        alternate_phone: source.alternate_phone.clone(),
        mobile: source.mobile.clone(),
        fax: source.fax.clone(),
        primary_email_addr: source.primary_email_addr.clone(),
        web_addr: source.web_addr.clone(),
        bill_addr: source.bill_addr.clone(),
        ship_addr: source.ship_addr.clone(),
        other_addr: source.other_addr.clone(),
        notes: source.notes.clone(),
        balance: source.balance,
        open_balance_date: source.open_balance_date.clone(),
        vendor_payment_bank_detail: source.vendor_payment_bank_detail.clone(),
        tax_identifier: source.tax_identifier.clone(),
        acct_num: source.acct_num.clone(),
        print_on_check_name: source.print_on_check_name.clone(),
        default_tax_code_ref: map_optional_tax_code(mapper, source.default_tax_code_ref.as_ref())
            .await,
        currency_ref: source
            .currency_ref
            .as_ref()
            .and_then(|c| mapper.map_currency(c)),
        vendor_type: source.vendor_type.clone(),
        t4a_eligible: source.t4a_eligible,
        t5018_eligible: source.t5018_eligible,
    }
}

/// Employees carry no tenant-local references
pub fn copy_employee(source: &Employee) -> Employee {
    Employee {
        id: None,
        sync_token: None,
        ..source.clone()
    }
}

/// Today's date in the format QuickBooks uses for `TxnDate`
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Journal entry copy; lines whose account does not map are dropped
///
/// An undated entry is dated `default_date`, the same date its existence
/// key was built with.
pub async fn copy_journal(
    source: &JournalEntry,
    default_date: &str,
    mapper: &mut ReferenceMapper<'_>,
    id_mapping: &IdMappingStore,
) -> JournalEntry {
    let txn_date = source.dated_key(default_date).txn_date;

    let department_ref = match source.department_ref.as_ref() {
        Some(r) => mapper.map_department(r).await,
        None => None,
    };

    let mut lines = Vec::with_capacity(source.line.len());
    for (index, line) in source.line.iter().enumerate() {
        match copy_journal_line(line, mapper, id_mapping).await {
            Some(copied) => lines.push(copied),
            None => log::error!(
                "Dropping line {} of journal entry {}: account could not be mapped",
                index + 1,
                source.key()
            ),
        }
    }

    JournalEntry {
        id: None,
        sync_token: None,
        txn_date: Some(txn_date),
        doc_number: source.doc_number.clone(),
        private_note: source.private_note.clone(),
        txn_tax_detail: source.txn_tax_detail.clone(),
        exchange_rate: source.exchange_rate,
        currency_ref: source
            .currency_ref
            .as_ref()
            .and_then(|c| mapper.map_currency(c)),
        department_ref,
        txn_status: source.txn_status.clone(),
        line: lines,
    }
}

/// One journal line; `None` when its account cannot be mapped
pub async fn copy_journal_line(
    source: &JournalLine,
    mapper: &mut ReferenceMapper<'_>,
    id_mapping: &IdMappingStore,
) -> Option<JournalLine> {
    let detail = match source.journal_entry_line_detail.as_ref() {
        Some(detail) => Some(copy_line_detail(detail, source.amount, mapper, id_mapping).await?),
        None => None,
    };

    Some(JournalLine {
        id: None,
        description: source.description.clone(),
        amount: source.amount,
        detail_type: source
            .detail_type
            .clone()
            .or_else(|| detail.as_ref().map(|_| JOURNAL_LINE_DETAIL.to_string())),
        journal_entry_line_detail: detail,
    })
}

async fn copy_line_detail(
    source: &JournalLineDetail,
    amount: Option<f64>,
    mapper: &mut ReferenceMapper<'_>,
    id_mapping: &IdMappingStore,
) -> Option<JournalLineDetail> {
    let posting_type = source.posting_type.clone().unwrap_or_else(|| {
        if amount.unwrap_or(0.0) >= 0.0 {
            "Debit".to_string()
        } else {
            "Credit".to_string()
        }
    });

    let account_ref = match source.account_ref.as_ref() {
        Some(account) => match mapper.map_account(account, id_mapping).await {
            Some(mapped) => Some(mapped),
            None => {
                log::error!("Failed to map account reference: {}", account);
                return None;
            }
        },
        None => None,
    };

    let class_ref = source
        .class_ref
        .as_ref()
        .and_then(|c| mapper.map_class(c, id_mapping));

    let entity = match source.entity.as_ref().and_then(|e| e.party()) {
        Some(party) => mapper
            .map_party(&party, id_mapping)
            .await
            .map(|p| p.into_line_entity()),
        None => None,
    };

    let tax_code_ref = map_optional_tax_code(mapper, source.tax_code_ref.as_ref()).await;
    let department_ref = match source.department_ref.as_ref() {
        Some(r) => mapper.map_department(r).await,
        None => None,
    };

    Some(JournalLineDetail {
        posting_type: Some(posting_type),
        account_ref,
        class_ref,
        entity,
        tax_code_ref,
        department_ref,
        tax_applicable_on: source.tax_applicable_on.clone(),
        tax_amount: source.tax_amount,
        billable_status: source.billable_status.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTenant;
    use crate::api::models::EntityType;
    use serde_json::json;

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = to_payload(&Employee {
            given_name: Some("Emily".into()),
            active: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payload, json!({"GivenName": "Emily", "Active": true}));
    }

    #[test]
    fn test_employee_copy_drops_identity() {
        let source = Employee {
            id: Some("4".into()),
            sync_token: Some("3".into()),
            given_name: Some("Emily".into()),
            family_name: Some("Platt".into()),
            ssn: Some("XXX-XX-1234".into()),
            ..Default::default()
        };
        let copied = copy_employee(&source);
        assert_eq!(copied.id, None);
        assert_eq!(copied.sync_token, None);
        assert_eq!(copied.family_name.as_deref(), Some("Platt"));
        assert_eq!(copied.ssn.as_deref(), Some("XXX-XX-1234"));
    }

    #[test]
    fn test_class_parent_by_path() {
        let target = Catalog::build(vec![Class {
            id: Some("300".into()),
            name: Some("B".into()),
            fully_qualified_name: Some("A:B".into()),
            ..Default::default()
        }]);
        let source = Class {
            id: Some("3".into()),
            name: Some("C".into()),
            fully_qualified_name: Some("A:B:C".into()),
            parent_ref: Some(Reference::new("2", Some("A:B".into()))),
            ..Default::default()
        };
        let copied = copy_class(&source, &IdMappingStore::new(), &target);
        assert_eq!(copied.parent_ref.unwrap().value, "300");
        assert_eq!(copied.sub_class, Some(true));
        assert_eq!(copied.fully_qualified_name, None);
    }

    #[test]
    fn test_class_without_target_parent_is_top_level() {
        let source = Class {
            id: Some("3".into()),
            name: Some("C".into()),
            fully_qualified_name: Some("A:B:C".into()),
            sub_class: Some(true),
            parent_ref: Some(Reference::new("2", Some("A:B".into()))),
            ..Default::default()
        };
        let copied = copy_class(&source, &IdMappingStore::new(), &Catalog::new());
        assert_eq!(copied.parent_ref, None);
        assert_eq!(copied.sub_class, None);

        let payload = to_payload(&copied).unwrap();
        assert_eq!(payload, json!({"Name": "C"}));
    }

    #[tokio::test]
    async fn test_account_parent_and_currency() {
        let source_tenant = MemoryTenant::new("source");
        let target_tenant = MemoryTenant::new("target");
        let mut mapper = ReferenceMapper::new(&source_tenant, &target_tenant, 1000);

        let mut ids = IdMappingStore::new();
        ids.record(EntityType::Account, "10", "900");
        let target = Catalog::build(vec![Account {
            id: Some("900".into()),
            name: Some("Assets".into()),
            ..Default::default()
        }]);

        let source = Account {
            id: Some("11".into()),
            name: Some("Petty Cash".into()),
            account_type: Some("Bank".into()),
            active: Some(true),
            sub_account: Some(true),
            parent_ref: Some(Reference::new("10", Some("Assets".into()))),
            currency_ref: Some(Reference::new("USD", Some("United States Dollar".into()))),
            ..Default::default()
        };
        let copied = copy_account(&source, &mut mapper, &ids, &target).await;
        assert_eq!(copied.sub_account, Some(true));
        assert_eq!(copied.parent_ref.unwrap().value, "900");
        assert_eq!(copied.currency_ref.unwrap().value, "USD");
        assert_eq!(copied.id, None);

        // Parent never reached the target
        let orphan = copy_account(&source, &mut mapper, &IdMappingStore::new(), &target).await;
        assert_eq!(orphan.parent_ref, None);
        assert_eq!(orphan.sub_account, None);
    }

    #[tokio::test]
    async fn test_account_payload_leaves_out_qualified_name() {
        let source_tenant = MemoryTenant::new("source");
        let target_tenant = MemoryTenant::new("target");
        let mut mapper = ReferenceMapper::new(&source_tenant, &target_tenant, 1000);

        let source = Account {
            id: Some("12".into()),
            name: Some("Checking".into()),
            fully_qualified_name: Some("Checking".into()),
            active: Some(true),
            ..Default::default()
        };
        let copied =
            copy_account(&source, &mut mapper, &IdMappingStore::new(), &Catalog::new()).await;
        let payload = to_payload(&copied).unwrap();
        assert!(payload.get("FullyQualifiedName").is_none());
        assert_eq!(payload["Name"], "Checking");
    }

    #[tokio::test]
    async fn test_undated_journal_uses_default_date() {
        let source_tenant = MemoryTenant::new("source");
        let target_tenant = MemoryTenant::new("target");
        let mut mapper = ReferenceMapper::new(&source_tenant, &target_tenant, 1000);

        let undated = JournalEntry {
            id: Some("50".into()),
            doc_number: Some("101".into()),
            ..Default::default()
        };
        let copied = copy_journal(&undated, "2024-03-01", &mut mapper, &IdMappingStore::new()).await;
        assert_eq!(copied.txn_date.as_deref(), Some("2024-03-01"));
        assert_eq!(copied.key(), undated.dated_key("2024-03-01"));
    }
}
