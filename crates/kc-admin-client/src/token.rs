// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Admin token acquisition and caching.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::{AdminConfig, Credentials};
use crate::error::{AdminError, Result};

/// A token issued by (or configured for) the token endpoint.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    /// Lifetime reported by the token endpoint, if any.
    pub expires_in: Option<Duration>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Body of a token endpoint response, success or OAuth2 error.
#[derive(Debug, Default, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenEndpointResponse {
    fn error_message(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        Some(match self.error_description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{}: {}", error, description)
            }
            _ => error.to_string(),
        })
    }
}

/// Obtain an admin token for the configured credentials.
///
/// Bearer credentials are returned as-is without touching the network; the
/// two grant types issue exactly one form-encoded POST to the realm's token
/// endpoint.
#[instrument(skip(http, config), fields(realm = %config.realm, method = %config.auth_method()))]
pub async fn fetch_token(http: &reqwest::Client, config: &AdminConfig) -> Result<AccessToken> {
    let form: Vec<(&str, &str)> = match &config.credentials {
        Credentials::Bearer { token } => {
            if token.is_empty() {
                return Err(AdminError::Config("bearer token is empty".to_string()));
            }
            return Ok(AccessToken {
                value: token.clone(),
                expires_in: None,
            });
        }
        Credentials::ClientCredentials {
            client_id,
            client_secret,
        } => vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ],
        Credentials::Password {
            username,
            password,
            client_id,
        } => vec![
            ("grant_type", "password"),
            ("client_id", client_id.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
        ],
    };

    let token_url = config.token_url();
    debug!(url = %token_url, "Requesting admin token");

    let response = http
        .post(&token_url)
        .header(reqwest::header::USER_AGENT, &config.user_agent)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            AdminError::Authentication(format!("token endpoint {} unreachable: {}", token_url, e))
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        AdminError::Authentication(format!("failed to read token response: {}", e))
    })?;

    let parsed = serde_json::from_str::<TokenEndpointResponse>(&text);

    if !status.is_success() {
        let detail = parsed
            .ok()
            .and_then(|body| body.error_message())
            .unwrap_or(text);
        warn!(status = status.as_u16(), "Token request rejected");
        return Err(AdminError::Authentication(format!(
            "token endpoint returned {}: {}",
            status, detail
        )));
    }

    let body = parsed.map_err(|e| {
        AdminError::Authentication(format!("token response is not valid JSON: {}", e))
    })?;

    match body.access_token {
        Some(value) if !value.is_empty() => Ok(AccessToken {
            value,
            expires_in: body.expires_in.map(Duration::from_secs),
        }),
        _ => Err(AdminError::Authentication(
            body.error_message()
                .unwrap_or_else(|| "token response has no access_token".to_string()),
        )),
    }
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, skew: Duration) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => Instant::now() + skew < expires_at,
        }
    }
}

/// Lazily populated token slot owned by one client.
///
/// The lock is held across a fetch, so concurrent callers that find the slot
/// empty or stale wait for a single token request instead of issuing their own.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get(&self, http: &reqwest::Client, config: &AdminConfig) -> Result<String> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref()
            && cached.is_fresh(config.token_expiry_skew)
        {
            return Ok(cached.value.clone());
        }

        let token = fetch_token(http, config).await?;
        let value = token.value.clone();
        *slot = Some(CachedToken {
            value: token.value,
            expires_at: token.expires_in.map(|ttl| Instant::now() + ttl),
        });
        Ok(value)
    }

    pub(crate) async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}
