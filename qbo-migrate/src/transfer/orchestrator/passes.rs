//! Per-type transfer policies

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ordering::{order_accounts, order_classes};
use super::{PassContext, Transfer};
use crate::api::error::ApiError;
use crate::config::IdMappingStore;
use crate::transfer::catalog::{Catalog, load_target_catalog};
use crate::transfer::copier::{
    copy_account, copy_class, copy_customer, copy_employee, copy_journal, copy_vendor, today,
};
use crate::transfer::existence::resolve_vendor;
use crate::transfer::mapper::ReferenceMapper;
use crate::transfer::types::{Account, Class, Customer, Employee, Entity, JournalEntry, Vendor};

/// QuickBooks "Duplicate Name Exists" fault
const DUPLICATE_NAME_CODE: &str = "6240";

static DUPLICATE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"Id=(\d+)").unwrap());

pub struct AccountTransfer<'a> {
    catalog: Catalog<Account>,
    mapper: ReferenceMapper<'a>,
    default_accounts: Vec<String>,
}

impl<'a> AccountTransfer<'a> {
    pub fn new(ctx: &PassContext<'a>) -> Self {
        Self {
            catalog: Catalog::new(),
            mapper: ReferenceMapper::new(ctx.source, ctx.target, ctx.options.max_results),
            default_accounts: ctx.options.default_accounts.clone(),
        }
    }

    /// Platform-seeded accounts every company already has
    fn is_default(&self, account: &Account) -> bool {
        let name = account.name.as_deref().unwrap_or_default();
        self.default_accounts
            .iter()
            .any(|default| name.contains(default.as_str()))
    }
}

#[async_trait]
impl<'a> Transfer for AccountTransfer<'a> {
    type Record = Account;

    fn catalog(&self) -> &Catalog<Account> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<Account> {
        &mut self.catalog
    }

    fn keep(&self, record: &Account) -> bool {
        if self.is_default(record) {
            log::info!(
                "Skipping default account: {}",
                record.name.as_deref().unwrap_or_default()
            );
            return false;
        }
        record.is_active()
    }

    fn order(&self, records: &mut Vec<Account>) {
        order_accounts(records);
    }

    async fn build(&mut self, record: &Account, id_mapping: &IdMappingStore) -> Account {
        copy_account(record, &mut self.mapper, id_mapping, &self.catalog).await
    }
}

pub struct EmployeeTransfer {
    catalog: Catalog<Employee>,
}

impl EmployeeTransfer {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }
}

#[async_trait]
impl Transfer for EmployeeTransfer {
    type Record = Employee;

    fn catalog(&self) -> &Catalog<Employee> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<Employee> {
        &mut self.catalog
    }

    async fn build(&mut self, record: &Employee, _id_mapping: &IdMappingStore) -> Employee {
        copy_employee(record)
    }
}

pub struct CustomerTransfer<'a> {
    catalog: Catalog<Customer>,
    mapper: ReferenceMapper<'a>,
}

impl<'a> CustomerTransfer<'a> {
    pub fn new(ctx: &PassContext<'a>) -> Self {
        Self {
            catalog: Catalog::new(),
            mapper: ReferenceMapper::new(ctx.source, ctx.target, ctx.options.max_results),
        }
    }
}

#[async_trait]
impl<'a> Transfer for CustomerTransfer<'a> {
    type Record = Customer;

    fn catalog(&self) -> &Catalog<Customer> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<Customer> {
        &mut self.catalog
    }

    async fn build(&mut self, record: &Customer, _id_mapping: &IdMappingStore) -> Customer {
        copy_customer(record, &mut self.mapper).await
    }
}

pub struct ClassTransfer {
    catalog: Catalog<Class>,
}

impl ClassTransfer {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }
}

#[async_trait]
impl Transfer for ClassTransfer {
    type Record = Class;

    fn catalog(&self) -> &Catalog<Class> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<Class> {
        &mut self.catalog
    }

    fn order(&self, records: &mut Vec<Class>) {
        order_classes(records);
    }

    async fn build(&mut self, record: &Class, id_mapping: &IdMappingStore) -> Class {
        copy_class(record, id_mapping, &self.catalog)
    }
}

pub struct VendorTransfer<'a> {
    catalog: Catalog<Vendor>,
    mapper: ReferenceMapper<'a>,
}

impl<'a> VendorTransfer<'a> {
    pub fn new(ctx: &PassContext<'a>) -> Self {
        Self {
            catalog: Catalog::new(),
            mapper: ReferenceMapper::new(ctx.source, ctx.target, ctx.options.max_results),
        }
    }
}

#[async_trait]
impl<'a> Transfer for VendorTransfer<'a> {
    type Record = Vendor;

    fn catalog(&self) -> &Catalog<Vendor> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<Vendor> {
        &mut self.catalog
    }

    /// Snapshot first, then a live `DisplayName` query
    async fn find_existing(&mut self, ctx: &PassContext<'_>, record: &Vendor) -> Option<Vendor> {
        let name = record.display_key()?;
        resolve_vendor(&mut self.catalog, ctx.target, &name).await
    }

    async fn build(&mut self, record: &Vendor, _id_mapping: &IdMappingStore) -> Vendor {
        copy_vendor(record, &mut self.mapper).await
    }

    /// Duplicate-name rejections name the existing vendor in their detail
    fn recover(&self, err: &ApiError) -> Option<String> {
        if err.error_code() != Some(DUPLICATE_NAME_CODE) {
            return None;
        }
        let detail = err.detail()?;
        DUPLICATE_ID
            .captures(detail)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

pub struct JournalTransfer<'a> {
    catalog: Catalog<JournalEntry>,
    mapper: ReferenceMapper<'a>,
    /// Date given to undated source entries, fixed for the whole pass
    default_date: String,
}

impl<'a> JournalTransfer<'a> {
    pub fn new(ctx: &PassContext<'a>) -> Self {
        Self {
            catalog: Catalog::new(),
            mapper: ReferenceMapper::new(ctx.source, ctx.target, ctx.options.max_results),
            default_date: today(),
        }
    }
}

#[async_trait]
impl<'a> Transfer for JournalTransfer<'a> {
    type Record = JournalEntry;

    fn catalog(&self) -> &Catalog<JournalEntry> {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog<JournalEntry> {
        &mut self.catalog
    }

    /// Journal entries plus every catalog their lines resolve against
    async fn load_target(
        &mut self,
        ctx: &PassContext<'_>,
        id_mapping: &mut IdMappingStore,
    ) -> Result<()> {
        let options = ctx.options;
        self.mapper
            .load_journal_catalogs(options.catalog_failure, id_mapping)
            .await?;
        self.catalog = load_target_catalog(
            ctx.target,
            options.max_results,
            options.catalog_failure,
            id_mapping,
        )
        .await?;
        Ok(())
    }

    fn keep(&self, _record: &JournalEntry) -> bool {
        true
    }

    /// Matched on the date the entry is created with
    async fn find_existing(
        &mut self,
        _ctx: &PassContext<'_>,
        record: &JournalEntry,
    ) -> Option<JournalEntry> {
        let key = record.dated_key(&self.default_date);
        self.catalog.resolve(&key).cloned()
    }

    fn updates_existing(&self) -> bool {
        true
    }

    async fn build(&mut self, record: &JournalEntry, id_mapping: &IdMappingStore) -> JournalEntry {
        copy_journal(record, &self.default_date, &mut self.mapper, id_mapping).await
    }

    fn remember(&mut self, record: JournalEntry) {
        self.catalog.upsert(record);
    }
}
