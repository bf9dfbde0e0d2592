//! Client-credentials token acquisition.
//!
//! `acquire` either reuses the cached credential or performs a refresh
//! against `{auth_url}/oauth/token`. The cache slot stays locked for the
//! whole check-refresh-store sequence, so overlapping callers wait for the
//! in-flight refresh instead of starting their own.

use std::time::Duration;

use reqwest::header::{ACCEPT, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::auth_config::AuthConfig;
use crate::cache::credential::Credential;
use crate::cache::credential_cache::CredentialCache;
use crate::config::service::OAuth2Config;
use crate::errors::AgentError;
use crate::helpers::time::now_i64;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_SUCCESS};
use crate::pipeline::context::RequestContext;
use crate::utils::constants::{
    EXPIRY_MARGIN_SECS, GRANT_TYPE_CLIENT_CREDENTIALS, TOKEN_PATH, TOKEN_REQUEST_TIMEOUT_SECS,
};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

/// Some servers send `expires_in` as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<i64> {
        match self {
            ExpiresIn::Seconds(seconds) => Some(*seconds),
            ExpiresIn::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenProvider {
    config: AuthConfig,
    cache: CredentialCache,
    client: Client,
    margin_seconds: i64,
    timeout: Duration,
}

impl TokenProvider {
    /// Validates the `oauth2` section and binds the provider to `cache`.
    pub fn init(raw: &OAuth2Config, cache: CredentialCache, client: Client) -> Result<Self, AgentError> {
        let config = AuthConfig::try_from(raw)?;
        info!(
            auth_url = %config.authorization_url,
            client_id = %config.client_id,
            scope = %config.scope_string(),
            "token provider initialized"
        );
        Ok(Self {
            config,
            cache,
            client,
            margin_seconds: EXPIRY_MARGIN_SECS,
            timeout: Duration::from_secs(TOKEN_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a credential to `ctx`, from the cache when possible.
    pub async fn acquire(&self, mut ctx: RequestContext) -> Result<RequestContext, AgentError> {
        if ctx.options.ignore_token_request {
            debug!("token request skipped");
            return Ok(ctx);
        }

        let metrics = get_metrics().await;
        let mut slot = self.cache.lock().await;

        if ctx.options.force_new_token {
            info!("fresh token requested, bypassing cache");
        } else if let Some(credential) = slot.usable(self.margin_seconds) {
            debug!(expires_at = credential.expires_at_unix_ts, "using cached token");
            metrics.token_cache_hits.inc();
            ctx.credential = Some(credential);
            return Ok(ctx);
        }

        // a failed refresh must leave nothing behind
        slot.clear();
        metrics.token_expiry_unix.set(0);

        let credential = self.refresh().await.inspect_err(|e| {
            metrics.token_requests.with_label_values(&[OUTCOME_ERROR]).inc();
            warn!(error = %e, "token refresh failed");
        })?;
        metrics.token_requests.with_label_values(&[OUTCOME_SUCCESS]).inc();
        metrics.token_expiry_unix.set(credential.expires_at_unix_ts);

        slot.store(credential.clone());
        ctx.credential = Some(credential.tagged(false));
        Ok(ctx)
    }

    async fn refresh(&self) -> Result<Credential, AgentError> {
        let url = format!("{}{}", self.config.authorization_url, TOKEN_PATH);
        let body = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            grant_type: GRANT_TYPE_CLIENT_CREDENTIALS,
            scope: self.config.scope_string(),
        };
        let timeout_secs = self.timeout.as_secs();

        debug!(url = %url, "requesting new access token");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::network(e, timeout_secs))?;

        let status = response.status();
        if status != StatusCode::OK {
            let www_authenticate = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let remote_body = response.text().await.unwrap_or_default();
            return Err(AgentError::AuthServer {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                remote_body,
                www_authenticate,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AgentError::network(e, timeout_secs))?;
        let token: TokenResponse = serde_json::from_str(&text).map_err(|e| AgentError::MalformedResponse {
            endpoint: url.clone(),
            message: e.to_string(),
        })?;
        let malformed = |message: &str| AgentError::MalformedResponse {
            endpoint: url.clone(),
            message: message.to_owned(),
        };
        if token.access_token.trim().is_empty() {
            return Err(malformed("access_token is empty"));
        }
        let lifetime = token
            .expires_in
            .seconds()
            .ok_or_else(|| malformed("expires_in is not an integer"))?;
        if lifetime <= 0 {
            return Err(malformed("expires_in must be positive"));
        }
        let expires_at = now_i64()
            .checked_add(lifetime)
            .ok_or_else(|| malformed("expires_in is out of range"))?;

        let credential = Credential::new(token.access_token, expires_at);
        info!(expires_in = lifetime, expires_at = credential.expires_at_unix_ts, "new access token issued");
        Ok(credential)
    }
}
