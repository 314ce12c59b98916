//! Intuit OAuth2 token handling
//!
//! Refresh-token and authorization-code grants against the Intuit token
//! endpoint. Token storage lives in the config layer.

use anyhow::{Context, Result};
use reqwest::Client;

use super::models::TokenInfo;

const TOKEN_ENDPOINT: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
const AUTHORIZATION_ENDPOINT: &str = "https://appcenter.intuit.com/connect/oauth2";
const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";

/// Authorization result parsed from the redirect the browser landed on
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationCallback {
    pub code: String,
    pub realm_id: Option<String>,
    pub state: Option<String>,
}

/// OAuth client for one Intuit app
#[derive(Clone)]
pub struct AuthManager {
    client_id: String,
    client_secret: String,
    http_client: Client,
}

impl AuthManager {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http_client: Client::new(),
        }
    }

    /// URL the user opens to grant access to a company
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&scope={}&redirect_uri={}&state={}",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(ACCOUNTING_SCOPE),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo> {
        self.request_tokens(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
        .context("Failed to refresh access token")
    }

    /// Exchange an authorization code for a token pair
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenInfo> {
        self.request_tokens(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
        .context("Failed to exchange authorization code")
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenInfo> {
        let response = self
            .http_client
            .post(TOKEN_ENDPOINT)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .context("Token request failed")?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("Token endpoint returned {}: {}", status, text.trim());
        }

        let tokens: TokenInfo =
            serde_json::from_str(&text).context("Failed to parse token response")?;
        log::debug!(
            "Received tokens (access expires in {:?}s)",
            tokens.expires_in
        );
        Ok(tokens)
    }
}

/// Parse `code`, `realmId` and `state` out of a redirect URL or bare query string
pub fn parse_callback(input: &str) -> Result<AuthorizationCallback> {
    let query = match input.split_once('?') {
        Some((_, query)) => query,
        None => input,
    };
    let query = query.split('#').next().unwrap_or_default();

    let mut code = None;
    let mut realm_id = None;
    let mut state = None;

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .with_context(|| format!("Invalid encoding for '{}'", key))?
            .into_owned();
        match key {
            "code" => code = Some(value),
            "realmId" => realm_id = Some(value),
            "state" => state = Some(value),
            _ => {}
        }
    }

    let code = code
        .filter(|c| !c.is_empty())
        .context("Redirect URL does not contain an authorization code")?;

    Ok(AuthorizationCallback {
        code,
        realm_id,
        state,
    })
}
