use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};

use super::MappingCommands;
use crate::api::models::EntityType;
use crate::config::{Config, IdMappingStore, resolve_config_path};

pub async fn handle_mapping_command(
    command: MappingCommands,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        MappingCommands::Show { entity, mapping } => {
            let path = mapping_path(mapping, config_path)?;
            let store = IdMappingStore::load(&path)?;
            print_mapping(&store, entity);
        }
        MappingCommands::Clear {
            entity,
            mapping,
            yes,
        } => {
            let path = mapping_path(mapping, config_path)?;
            let mut store = IdMappingStore::load(&path)?;
            let scope = entity
                .map(|e| format!("{} mappings", e))
                .unwrap_or_else(|| "all mappings".to_string());

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Remove {} from {}?", scope, path.display()))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }

            let removed = store.clear(entity);
            store.save(&path)?;
            println!("{} Removed {} entries ({})", "✓".green(), removed, scope);
        }
    }
    Ok(())
}

/// `--mapping`, else the file named in the config, else the default name
fn mapping_path(explicit: Option<PathBuf>, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let path = resolve_config_path(config_path)?;
    if !path.exists() {
        return Ok(crate::config::MigrationOptions::default().id_mapping_file);
    }
    Ok(Config::load(&path)?.migration.id_mapping_file)
}

fn print_mapping(store: &IdMappingStore, only: Option<EntityType>) {
    if store.is_empty() {
        println!("{}", "No id mappings recorded".dimmed());
        return;
    }

    let types: Vec<EntityType> = match only {
        Some(entity) => vec![entity],
        None => store.entity_types().copied().collect(),
    };

    for entity in types {
        let Some(entries) = store.entries(entity) else {
            println!("{}: {}", entity.to_string().bold(), "none".dimmed());
            continue;
        };
        println!("{} ({})", entity.to_string().bold(), entries.len());
        for (source_id, target_id) in entries {
            println!("  {} → {}", source_id, target_id.bright_green());
        }
    }
}
