use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub static OUTCOME_SUCCESS: &str = "success";
pub static OUTCOME_ERROR: &str = "error";
pub static OUTCOME_RETRY: &str = "retry";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_requests: IntCounterVec,
    pub token_cache_hits: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Submission metrics
    pub submissions: IntCounterVec,

    // Cycle metrics
    pub cycles: IntCounterVec,
    pub cycle_duration: HistogramVec,

    pub up: IntGauge,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("telemetryagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token refresh requests by outcome"),&["outcome"],).unwrap(),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Acquisitions served from the credential cache").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry timestamp of the cached credential").unwrap(),

            // Submission
            submissions: IntCounterVec::new(Opts::new("submissions_total", "Data submissions by outcome"),&["outcome"],).unwrap(),

            // Cycle
            cycles: IntCounterVec::new(Opts::new("cycles_total", "Collection cycles by outcome"),&["outcome"],).unwrap(),
            cycle_duration: HistogramVec::new(HistogramOpts::new("cycle_duration_seconds", "Collection cycle duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),&["outcome"],).unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.submissions.clone())).unwrap();
        reg.register(Box::new(metrics.cycles.clone())).unwrap();
        reg.register(Box::new(metrics.cycle_duration.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
