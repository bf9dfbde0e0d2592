use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::auth::token_provider::TokenProvider;
use crate::cache::credential_cache::CredentialCache;
use crate::config::service::ServiceConfig;
use crate::config::settings::CollectConfig;
use crate::errors::AgentError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR};
use crate::pipeline::cycle::{Cycle, CycleOutcome};
use crate::sensor::generator::SensorGenerator;
use crate::submission::coordinator::SubmissionCoordinator;

/// Runs collection cycles one at a time, on a fixed interval or once.
#[derive(Debug, Clone)]
pub struct Driver {
    cycle: Cycle,
    generator: SensorGenerator,
    collect: CollectConfig,
}

impl Driver {
    pub fn new(cycle: Cycle, generator: SensorGenerator, collect: CollectConfig) -> Self {
        Self { cycle, generator, collect }
    }

    /// Composition root: wires one cache into the provider and builds the pipeline.
    pub fn from_config(config: &ServiceConfig, cache: CredentialCache, client: Client) -> Result<Self, AgentError> {
        let provider = TokenProvider::init(&config.oauth2, cache, client.clone())?;
        let coordinator = SubmissionCoordinator::new(&config.remote.api_url, client);
        Ok(Self::new(
            Cycle::new(provider, coordinator),
            SensorGenerator::new(config.settings.device.id.clone()),
            config.settings.collect.clone(),
        ))
    }

    /// One reading, end to end. Errors are logged and discarded so the next
    /// cycle starts clean.
    pub async fn run_once(&self) -> Option<CycleOutcome> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let reading = self.generator.read();
        info!(device_id = %reading.device_id, timestamp = %reading.timestamp, "collection cycle start");

        match self.cycle.run(reading).await {
            Ok(report) => {
                let label = report.outcome.label();
                metrics.cycles.with_label_values(&[label]).inc();
                metrics.cycle_duration.with_label_values(&[label]).observe(start.elapsed().as_secs_f64());
                info!(outcome = label, "collection cycle finished");
                Some(report.outcome)
            }
            Err(e) => {
                metrics.cycles.with_label_values(&[OUTCOME_ERROR]).inc();
                metrics.cycle_duration.with_label_values(&[OUTCOME_ERROR]).observe(start.elapsed().as_secs_f64());
                error!(error = %e, kind = e.kind(), "collection cycle failed");
                None
            }
        }
    }

    /// Collect until `shutdown` resolves. Ticks that fall due while a cycle
    /// is still running are skipped, so cycles never overlap.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.collect.disabled {
            info!("collection timer disabled, running a single cycle");
            self.run_once().await;
            return Ok(());
        }

        let mut ticker = interval(Duration::from_secs(self.collect.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_seconds = self.collect.interval_seconds, "collection timer started");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, collection timer stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
        Ok(())
    }
}
