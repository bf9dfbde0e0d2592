//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Covers settings (schedule, logging, metrics server) and the remote API.
//!
//! The `oauth2` section is checked by `TokenProvider::init`, which reports
//! the first offending field as a typed configuration error.

use tracing::{error, info};

use crate::config::service::{RemoteConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_remote(&cfg.remote, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.collect.interval_seconds == 0 {
        errors.push("settings.collect.interval_seconds must be > 0".to_string());
    }

    if settings.device.id.trim().is_empty() {
        errors.push("settings.device.id must not be empty".to_string());
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' is not one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled {
        if !settings.metrics.path.starts_with('/') {
            errors.push(format!(
                "settings.metrics.path '{}' must start with '/'",
                settings.metrics.path
            ));
        }
        if settings.server.port.parse::<u16>().is_err() {
            errors.push(format!(
                "settings.server.port '{}' is not a valid port",
                settings.server.port
            ));
        }
    }
}

fn validate_remote(remote: &RemoteConfig, errors: &mut Vec<String>) {
    let url = remote.api_url.trim();
    if url.is_empty() {
        errors.push("remote.api_url must not be empty".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("remote.api_url '{}' must be an http(s) URL", url));
    }
}
