use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AgentError;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_RETRY, OUTCOME_SUCCESS};
use crate::pipeline::context::RequestContext;
use crate::utils::constants::{IOT_DATA_PATH, SUBMISSION_TIMEOUT_SECS};

/// Posts readings to `{api_url}/v1/data/iot-data/`.
#[derive(Debug, Clone)]
pub struct SubmissionCoordinator {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl SubmissionCoordinator {
    pub fn new(api_url: &str, client: Client) -> Self {
        Self {
            endpoint: format!("{}{}", api_url.trim().trim_end_matches('/'), IOT_DATA_PATH),
            client,
            timeout: Duration::from_secs(SUBMISSION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit the payload carried by `ctx`.
    ///
    /// A `401` for a cache-served credential is returned as `Ok` with
    /// `force_new_token` armed and the credential dropped; every other
    /// rejection is an error.
    pub async fn submit(&self, mut ctx: RequestContext) -> Result<RequestContext, AgentError> {
        if ctx.options.ignore_submission {
            debug!("submission skipped");
            return Ok(ctx);
        }
        let Some(credential) = ctx.credential.as_ref() else {
            debug!("no credential attached, submission skipped");
            return Ok(ctx);
        };

        let served_from_cache = credential.served_from_cache;
        let bearer = credential.bearer();

        let metrics = get_metrics().await;
        let timeout_secs = self.timeout.as_secs();

        debug!(url = %self.endpoint, cached = served_from_cache, "submitting reading");
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, bearer)
            .json(&ctx.payload)
            .send()
            .await
            .map_err(|e| {
                metrics.submissions.with_label_values(&[OUTCOME_ERROR]).inc();
                AgentError::network(e, timeout_secs)
            })?;

        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|e| {
                metrics.submissions.with_label_values(&[OUTCOME_ERROR]).inc();
                AgentError::network(e, timeout_secs)
            })?;
            let record = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    metrics.submissions.with_label_values(&[OUTCOME_ERROR]).inc();
                    AgentError::MalformedResponse { endpoint: self.endpoint.clone(), message: e.to_string() }
                })?
            };
            metrics.submissions.with_label_values(&[OUTCOME_SUCCESS]).inc();
            let id = record.get("id").cloned().unwrap_or_default();
            info!(status = status.as_u16(), id = %id, "reading stored");

            ctx.created_record = Some(record);
            ctx.options.ignore_token_request = true;
            ctx.options.ignore_submission = true;
            ctx.options.force_new_token = false;
            return Ok(ctx);
        }

        if status == StatusCode::UNAUTHORIZED && served_from_cache {
            metrics.submissions.with_label_values(&[OUTCOME_RETRY]).inc();
            warn!("cached token rejected by remote API, retrying with a fresh one");
            ctx.options.force_new_token = true;
            ctx.options.ignore_submission = false;
            ctx.credential = None;
            return Ok(ctx);
        }

        metrics.submissions.with_label_values(&[OUTCOME_ERROR]).inc();
        let remote_body = response.text().await.unwrap_or_default();
        Err(AgentError::Submission {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            remote_body,
        })
    }
}
