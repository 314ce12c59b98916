//! Migrate command handler

use anyhow::Result;
use colored::*;
use std::path::Path;
use std::time::Instant;

use super::MigrateCommands;
use crate::api::{DryRunTenant, QuickBooksClient, TenantApi};
use crate::cli::commands::auth::refresh_company;
use crate::config::{CompanyRole, Config, IdMappingStore, resolve_config_path};
use crate::transfer::{PassContext, PipelineReport, run_pipeline};

pub async fn handle_migrate_command(args: MigrateCommands, config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let mut config = Config::load(&path)?;

    if config.migration.refresh_tokens_on_start {
        config.require_app_credentials()?;
        for role in [CompanyRole::Source, CompanyRole::Target] {
            refresh_company(&mut config, role).await?;
        }
        config.save(&path)?;
        log::info!("Saved refreshed tokens to {}", path.display());
    }

    let source = client_for(&config, CompanyRole::Source)?;
    let target = client_for(&config, CompanyRole::Target)?;

    let mapping_path = args
        .mapping
        .clone()
        .unwrap_or_else(|| config.migration.id_mapping_file.clone());
    let mut id_mapping = IdMappingStore::load(&mapping_path)?;

    println!(
        "Migrating {} → {}{}",
        config.source.company_id.bright_green().bold(),
        config.target.company_id.bright_green().bold(),
        if args.dry_run {
            " (dry run)".yellow().to_string()
        } else {
            String::new()
        }
    );

    let started = Instant::now();
    let report = if args.dry_run {
        let target = DryRunTenant::new(target);
        let report = run(&source, &target, &config, None, &mut id_mapping, &args).await;
        println!("{} writes would have been sent", target.write_count());
        report
    } else {
        run(&source, &target, &config, Some(&mapping_path), &mut id_mapping, &args).await
    };

    print_report(&report);
    println!("Total time: {:.1}s", started.elapsed().as_secs_f64());
    if !args.dry_run {
        println!(
            "Id mapping saved to {}",
            mapping_path.display().to_string().cyan()
        );
    }

    match report.aborted {
        Some((entity, err)) => Err(err.context(format!("{} transfer aborted", entity))),
        None => Ok(()),
    }
}

async fn run(
    source: &dyn TenantApi,
    target: &dyn TenantApi,
    config: &Config,
    checkpoint: Option<&Path>,
    id_mapping: &mut IdMappingStore,
    args: &MigrateCommands,
) -> PipelineReport {
    let ctx = PassContext {
        source,
        target,
        options: &config.migration,
        checkpoint,
    };
    run_pipeline(&ctx, id_mapping, &args.only).await
}

fn client_for(config: &Config, role: CompanyRole) -> Result<QuickBooksClient> {
    let company = config.company(role);
    if !company.is_authorized() {
        anyhow::bail!(
            "The {} company is not authorized. Run 'qbo-migrate auth login --company {}'.",
            role,
            role
        );
    }
    Ok(QuickBooksClient::new(
        role.as_str(),
        company.environment,
        &company.company_id,
        &company.access_token,
        config.migration.minor_version,
    ))
}

fn print_report(report: &PipelineReport) {
    println!();
    println!("{}", "Migration summary".bold());
    println!(
        "  {:<16} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "", "processed", "existing", "created", "updated", "failed", "total ok"
    );
    for (entity, summary) in &report.summaries {
        let failed = if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        };
        println!(
            "  {:<16} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            entity.plural_label(),
            summary.processed,
            summary.skipped,
            summary.created.to_string().green(),
            summary.updated,
            failed,
            summary.total_successful()
        );
    }
    if let Some((entity, err)) = &report.aborted {
        println!(
            "  {:<16} {}",
            entity.plural_label(),
            format!("aborted: {:#}", err).red()
        );
    }
}
