//! One collection cycle as an explicit two-attempt state machine:
//!
//! ```text
//! Attempt1 ──accepted/skipped──────────────▶ Done
//!    │
//!    └─cached token rejected─▶ Attempt2 ──▶ Done
//! ```
//!
//! Each attempt is `acquire → submit`. A second rejection ends the cycle;
//! there is never a third attempt.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::token_provider::TokenProvider;
use crate::errors::AgentError;
use crate::pipeline::context::RequestContext;
use crate::sensor::generator::SensorReading;
use crate::submission::coordinator::SubmissionCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Attempt1,
    Attempt2,
    Done,
}

/// Result of one `acquire → submit` pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptResult {
    Accepted(Value),
    RetryWithFreshToken,
    /// nothing was sent (no credential, or submission disabled)
    Skipped,
}

impl AttemptResult {
    fn classify(ctx: &RequestContext) -> Self {
        if let Some(record) = &ctx.created_record {
            AttemptResult::Accepted(record.clone())
        } else if ctx.wants_fresh_token() {
            AttemptResult::RetryWithFreshToken
        } else {
            AttemptResult::Skipped
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Submitted { record: Value, attempts: u8 },
    Skipped,
    /// the refreshed credential was rejected as well
    Rejected,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Submitted { .. } => "submitted",
            CycleOutcome::Skipped => "skipped",
            CycleOutcome::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub context: RequestContext,
}

#[derive(Debug, Clone)]
pub struct Cycle {
    provider: TokenProvider,
    coordinator: SubmissionCoordinator,
}

impl Cycle {
    pub fn new(provider: TokenProvider, coordinator: SubmissionCoordinator) -> Self {
        Self { provider, coordinator }
    }

    pub async fn attempt(&self, ctx: RequestContext) -> Result<(RequestContext, AttemptResult), AgentError> {
        let ctx = self.provider.acquire(ctx).await?;
        let ctx = self.coordinator.submit(ctx).await?;
        let result = AttemptResult::classify(&ctx);
        Ok((ctx, result))
    }

    pub async fn run(&self, reading: SensorReading) -> Result<CycleReport, AgentError> {
        self.run_with(RequestContext::new(reading)).await
    }

    pub async fn run_with(&self, mut ctx: RequestContext) -> Result<CycleReport, AgentError> {
        let mut stage = CycleStage::Attempt1;
        let mut attempts: u8 = 0;
        let mut outcome = CycleOutcome::Skipped;

        while stage != CycleStage::Done {
            attempts += 1;
            debug!(?stage, "cycle attempt");
            let (next, result) = self.attempt(ctx).await?;
            ctx = next;

            stage = match (stage, result) {
                (_, AttemptResult::Accepted(record)) => {
                    outcome = CycleOutcome::Submitted { record, attempts };
                    CycleStage::Done
                }
                (CycleStage::Attempt1, AttemptResult::RetryWithFreshToken) => {
                    info!("retrying submission with a fresh token");
                    CycleStage::Attempt2
                }
                (_, AttemptResult::RetryWithFreshToken) => {
                    warn!("fresh token rejected as well, giving up on this reading");
                    outcome = CycleOutcome::Rejected;
                    CycleStage::Done
                }
                (_, AttemptResult::Skipped) => {
                    outcome = CycleOutcome::Skipped;
                    CycleStage::Done
                }
            };
        }

        Ok(CycleReport { outcome, context: ctx })
    }
}
