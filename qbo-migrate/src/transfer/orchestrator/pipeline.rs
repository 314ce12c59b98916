//! Fixed-order sequence of passes sharing one id mapping

use anyhow::{Result, bail};

use super::passes::{
    AccountTransfer, ClassTransfer, CustomerTransfer, EmployeeTransfer, JournalTransfer,
    VendorTransfer,
};
use super::{PassContext, PassSummary, run_pass};
use crate::api::models::EntityType;
use crate::config::IdMappingStore;

/// Outcome of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Completed passes, in run order
    pub summaries: Vec<(EntityType, PassSummary)>,
    /// The pass that failed at its top level, stopping the run
    pub aborted: Option<(EntityType, anyhow::Error)>,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    pub fn summary(&self, entity: EntityType) -> Option<&PassSummary> {
        self.summaries
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, s)| s)
    }
}

/// Run the pass for a single entity type
pub async fn run_entity_pass(
    entity: EntityType,
    ctx: &PassContext<'_>,
    id_mapping: &mut IdMappingStore,
) -> Result<PassSummary> {
    match entity {
        EntityType::Account => run_pass(&mut AccountTransfer::new(ctx), ctx, id_mapping).await,
        EntityType::Employee => run_pass(&mut EmployeeTransfer::new(), ctx, id_mapping).await,
        EntityType::Customer => run_pass(&mut CustomerTransfer::new(ctx), ctx, id_mapping).await,
        EntityType::Class => run_pass(&mut ClassTransfer::new(), ctx, id_mapping).await,
        EntityType::Vendor => run_pass(&mut VendorTransfer::new(ctx), ctx, id_mapping).await,
        EntityType::JournalEntry => {
            run_pass(&mut JournalTransfer::new(ctx), ctx, id_mapping).await
        }
        EntityType::TaxCode | EntityType::Department => {
            bail!("{} is a lookup list and is not transferred", entity)
        }
    }
}

/// Run the passes in pipeline order, restricted to `only` when non-empty
///
/// A pass that fails stops the run. The mapping is saved after every pass
/// and once more at the end, whether or not the run completed.
pub async fn run_pipeline(
    ctx: &PassContext<'_>,
    id_mapping: &mut IdMappingStore,
    only: &[EntityType],
) -> PipelineReport {
    let mut report = PipelineReport::default();

    for entity in EntityType::PIPELINE
        .into_iter()
        .filter(|e| only.is_empty() || only.contains(e))
    {
        match run_entity_pass(entity, ctx, id_mapping).await {
            Ok(summary) => {
                report.summaries.push((entity, summary));
                ctx.save_mapping(id_mapping);
            }
            Err(err) => {
                log::error!("Error in {} transfer: {:#}", entity, err);
                report.aborted = Some((entity, err));
                break;
            }
        }
    }

    ctx.save_mapping(id_mapping);
    report
}
