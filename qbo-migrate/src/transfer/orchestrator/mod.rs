//! Entity transfer orchestrator
//!
//! One pass per entity type: load target, load source, filter, order, then
//! process each record in turn. Per-record failures are counted and the pass
//! continues; only a failure to load a whole catalog aborts it.

mod ordering;
mod passes;
mod pipeline;

pub use ordering::{order_accounts, order_classes};
pub use passes::{
    AccountTransfer, ClassTransfer, CustomerTransfer, EmployeeTransfer, JournalTransfer,
    VendorTransfer,
};
pub use pipeline::{PipelineReport, run_entity_pass, run_pipeline};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use super::catalog::{Catalog, load_records, load_target_catalog};
use super::copier::to_payload;
use super::types::Entity;
use crate::api::error::ApiError;
use crate::api::tenant::{TenantApi, decode};
use crate::config::{IdMappingStore, MigrationOptions};

/// Everything a pass reads but never changes
pub struct PassContext<'a> {
    pub source: &'a dyn TenantApi,
    pub target: &'a dyn TenantApi,
    pub options: &'a MigrationOptions,
    /// Where the id mapping is checkpointed; `None` disables persistence
    pub checkpoint: Option<&'a Path>,
}

impl PassContext<'_> {
    /// Persist the mapping; a failed save is logged and the run goes on
    pub fn save_mapping(&self, id_mapping: &IdMappingStore) {
        if let Some(path) = self.checkpoint {
            match id_mapping.save(path) {
                Ok(()) => log::debug!("Saved {} id mappings to {}", id_mapping.len(), path.display()),
                Err(err) => log::error!("Failed to save id mapping: {:#}", err),
            }
        }
    }
}

/// Counts reported at the end of a pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub processed: usize,
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub filtered_out: usize,
}

impl PassSummary {
    pub fn total_successful(&self) -> usize {
        self.skipped + self.created + self.updated
    }
}

/// What happened to one source record
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Existing(String),
    Created(String),
    Updated(String),
}

impl Outcome {
    fn target_id(&self) -> &str {
        match self {
            Outcome::Existing(id) | Outcome::Created(id) | Outcome::Updated(id) => id,
        }
    }
}

/// Per-type policy plugged into the generic pass
#[async_trait]
pub trait Transfer: Send + Sync {
    type Record: Entity;

    /// Target records already present, indexed for existence checks
    fn catalog(&self) -> &Catalog<Self::Record>;

    fn catalog_mut(&mut self) -> &mut Catalog<Self::Record>;

    /// Load the target-side state of the pass
    async fn load_target(
        &mut self,
        ctx: &PassContext<'_>,
        id_mapping: &mut IdMappingStore,
    ) -> Result<()> {
        let options = ctx.options;
        *self.catalog_mut() = load_target_catalog(
            ctx.target,
            options.max_results,
            options.catalog_failure,
            id_mapping,
        )
        .await?;
        Ok(())
    }

    /// Whether a source record takes part in the pass
    fn keep(&self, record: &Self::Record) -> bool {
        record.is_active()
    }

    fn order(&self, _records: &mut Vec<Self::Record>) {}

    /// Target equivalent of a source record
    async fn find_existing(
        &mut self,
        _ctx: &PassContext<'_>,
        record: &Self::Record,
    ) -> Option<Self::Record> {
        let key = record.display_key()?;
        self.catalog().resolve(&key).cloned()
    }

    /// Existing matches are updated in place rather than skipped
    fn updates_existing(&self) -> bool {
        false
    }

    /// Target-bound copy of a source record
    async fn build(&mut self, record: &Self::Record, id_mapping: &IdMappingStore) -> Self::Record;

    /// Track a record now present in the target
    fn remember(&mut self, record: Self::Record) {
        self.catalog_mut().insert(record);
    }

    /// Target id of an existing record named in a create rejection
    fn recover(&self, _err: &ApiError) -> Option<String> {
        None
    }
}

/// Run one full pass of `transfer`
///
/// Errors returned here abort the pass; per-record failures only show up in
/// the summary.
pub async fn run_pass<T: Transfer>(
    transfer: &mut T,
    ctx: &PassContext<'_>,
    id_mapping: &mut IdMappingStore,
) -> Result<PassSummary> {
    let entity = T::Record::TYPE;
    let mut summary = PassSummary::default();
    log::info!("Starting {} transfer...", entity);

    log::info!("Getting existing {} from target company...", entity.plural_label());
    transfer
        .load_target(ctx, id_mapping)
        .await
        .with_context(|| format!("Failed to load target {}", entity.plural_label()))?;
    log::info!(
        "Found {} existing {} in target company",
        transfer.catalog().len(),
        entity.plural_label()
    );

    log::info!("Getting {} from source company...", entity.plural_label());
    let mut records: Vec<T::Record> = load_records(ctx.source, ctx.options.max_results).await?;

    let total = records.len();
    records.retain(|record| {
        let keep = transfer.keep(record);
        if !keep {
            log::debug!("Skipping {} {}", entity, record.label());
        }
        keep
    });
    summary.filtered_out = total - records.len();
    log::info!(
        "Found {} {} to process ({} filtered out)",
        records.len(),
        entity.plural_label(),
        summary.filtered_out
    );

    transfer.order(&mut records);

    let count = records.len();
    for (index, record) in records.iter().enumerate() {
        let label = record.label();
        log::info!("Processing {} {}/{}: {}", entity, index + 1, count, label);
        summary.processed += 1;

        match process_record(transfer, ctx, record, id_mapping).await {
            Ok(outcome) => {
                match &outcome {
                    Outcome::Existing(_) => summary.skipped += 1,
                    Outcome::Created(_) => summary.created += 1,
                    Outcome::Updated(_) => summary.updated += 1,
                }
                if let Some(source_id) = record.id() {
                    id_mapping.record(entity, source_id, outcome.target_id());
                }

                let interval = ctx.options.checkpoint_interval;
                if interval > 0 && summary.total_successful() % interval == 0 {
                    ctx.save_mapping(id_mapping);
                }
            }
            Err(err) => {
                summary.failed += 1;
                match err.downcast_ref::<ApiError>() {
                    Some(api) => api.log_rejection(&format!("{} {}", entity, label)),
                    None => log::error!("Error creating {} {}: {:#}", entity, label, err),
                }
            }
        }
    }

    log::info!(
        "{} transfer complete: processed {}, skipped {} existing, created {}, updated {}, failed {}, total successful {}",
        entity,
        summary.processed,
        summary.skipped,
        summary.created,
        summary.updated,
        summary.failed,
        summary.total_successful()
    );
    Ok(summary)
}

async fn process_record<T: Transfer>(
    transfer: &mut T,
    ctx: &PassContext<'_>,
    record: &T::Record,
    id_mapping: &IdMappingStore,
) -> Result<Outcome> {
    let entity = T::Record::TYPE;

    let existing = transfer.find_existing(ctx, record).await;
    if let Some(existing) = existing {
        let target_id = existing
            .id()
            .map(str::to_string)
            .with_context(|| format!("Existing target {} has no id", entity))?;

        if !transfer.updates_existing() {
            log::info!("{} already exists: {} (ID: {})", entity, record.label(), target_id);
            return Ok(Outcome::Existing(target_id));
        }

        let copied = transfer.build(record, id_mapping).await;
        let payload = with_identity(to_payload(&copied)?, &existing);
        let raw = ctx.target.update(entity, payload).await?;
        let updated: T::Record = decode(entity, raw)?;
        log::info!("Updated {}: {} (ID: {})", entity, record.label(), target_id);
        transfer.remember(updated);
        return Ok(Outcome::Updated(target_id));
    }

    let copied = transfer.build(record, id_mapping).await;
    let payload = to_payload(&copied)?;
    match ctx.target.create(entity, payload).await {
        Ok(raw) => {
            let created: T::Record = decode(entity, raw)?;
            let target_id = created
                .id()
                .map(str::to_string)
                .with_context(|| format!("Created {} came back without an id", entity))?;
            log::info!("Created {}: {} (ID: {})", entity, record.label(), target_id);
            transfer.remember(created);
            Ok(Outcome::Created(target_id))
        }
        Err(err) => match transfer.recover(&err) {
            Some(target_id) => {
                log::info!(
                    "{} already exists: {} (ID: {}, from duplicate-name error)",
                    entity,
                    record.label(),
                    target_id
                );
                Ok(Outcome::Existing(target_id))
            }
            None => Err(err.into()),
        },
    }
}

/// Carry the existing target `Id` and `SyncToken` onto an update payload
fn with_identity<E: Entity>(mut payload: Value, existing: &E) -> Value {
    let identity = serde_json::to_value(existing).ok();
    if let (Some(map), Some(identity)) = (payload.as_object_mut(), identity) {
        for field in ["Id", "SyncToken"] {
            if let Some(value) = identity.get(field).filter(|v| !v.is_null()) {
                map.insert(field.to_string(), value.clone());
            }
        }
    }
    payload
}
