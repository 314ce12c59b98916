use anyhow::{Context, Result};
use colored::*;
use dialoguer::Input;
use std::path::Path;

use super::AuthCommands;
use crate::api::AuthManager;
use crate::api::auth::parse_callback;
use crate::config::{CompanyRole, Config, resolve_config_path};

pub async fn handle_auth_command(command: AuthCommands, config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let mut config = Config::load(&path)?;
    config.require_app_credentials()?;

    match command {
        AuthCommands::Refresh { company } => {
            let roles = match company {
                Some(role) => vec![role],
                None => vec![CompanyRole::Source, CompanyRole::Target],
            };
            for role in roles {
                refresh_company(&mut config, role).await?;
                println!("{} {} tokens refreshed", "✓".green(), role);
            }
            config.save(&path)?;
        }
        AuthCommands::Login { company } => {
            login(&mut config, company).await?;
            config.save(&path)?;
            println!(
                "{} {} company {} authorized",
                "✓".green(),
                company,
                config.company(company).company_id.bright_green().bold()
            );
        }
    }

    println!("Saved credentials to {}", path.display().to_string().cyan());
    Ok(())
}

/// Rotate one company's tokens in `config` (the caller saves)
pub async fn refresh_company(config: &mut Config, role: CompanyRole) -> Result<()> {
    let refresh_token = config.company(role).refresh_token.clone();
    if refresh_token.is_empty() {
        anyhow::bail!(
            "No refresh token for the {} company. Run 'qbo-migrate auth login --company {}' first.",
            role,
            role
        );
    }

    log::info!("Refreshing {} company tokens...", role);
    let auth = AuthManager::new(&config.client_id, &config.client_secret);
    let tokens = auth
        .refresh(&refresh_token)
        .await
        .with_context(|| format!("Could not refresh the {} company tokens", role))?;
    config.company_mut(role).apply_tokens(&tokens);
    Ok(())
}

async fn login(config: &mut Config, role: CompanyRole) -> Result<()> {
    let redirect_uri = config.company(role).redirect_uri.clone();
    if redirect_uri.is_empty() {
        anyhow::bail!("Set redirect_uri for the [{}] company in the config file", role);
    }

    let auth = AuthManager::new(&config.client_id, &config.client_secret);
    let state = format!("qbo-migrate-{}-{}", role, chrono::Utc::now().timestamp());
    println!("Open this URL in a browser and connect the {} company:", role);
    println!();
    println!("  {}", auth.authorization_url(&redirect_uri, &state).cyan());
    println!();

    let landed: String = Input::new()
        .with_prompt("Paste the URL the browser was redirected to")
        .interact_text()
        .context("Failed to read redirect URL")?;

    let callback = parse_callback(landed.trim())?;
    if callback.state.as_deref().is_some_and(|s| s != state) {
        anyhow::bail!("State mismatch in redirect URL; start the login again");
    }

    let tokens = auth.exchange_code(&callback.code, &redirect_uri).await?;
    let company = config.company_mut(role);
    company.apply_tokens(&tokens);
    if let Some(realm_id) = callback.realm_id {
        company.company_id = realm_id;
    }
    if company.company_id.is_empty() {
        anyhow::bail!("Redirect URL did not include a realmId; set company_id manually");
    }
    Ok(())
}
