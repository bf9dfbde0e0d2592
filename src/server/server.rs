use anyhow::{Context, Result};
use tracing::info;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;

/// Serve the metrics endpoint until the process exits. No-op when metrics are disabled.
pub async fn start(settings_config: &SettingsConfig) -> Result<()> {
    let metrics = get_metrics().await;
    metrics.up.set(1);

    if !settings_config.metrics.is_enabled {
        return Ok(());
    }

    let state = MetricsState::new(metrics.registry.clone());
    let app = state.router(&settings_config.metrics);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind metrics server on {}", bind_addr))?;
    info!("metrics server listening on {}{}", bind_addr, settings_config.metrics.path);
    axum::serve(listener, app).await?;

    Ok(())
}
