use std::{fs, path::Path};
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::service::ServiceConfig;
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error, warn};
use crate::config::proc_validator;

/// Used when no config file exists; every value can be overridden from the
/// environment.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"
settings:
  pid_filename: ${APP_PID_FILENAME:}
  collect:
    interval_seconds: ${APP_DATA_COLLECT_INTERVAL_SEC:60}
    disabled: ${APP_DISABLE_DATA_COLLECT_TIMER:false}
  device:
    id: ${APP_DEVICE_ID:iot-device-12}
  metrics:
    is_enabled: ${METRICS_ENABLED:false}
    path: /metrics
  server:
    host: ${METRICS_HOST:127.0.0.1}
    port: "${METRICS_PORT:9100}"
  logging:
    level: ${LOG_LEVEL:info}
    format: ${LOG_FORMAT:compact}
oauth2:
  auth_url: ${OAUTH2_AUTH_URL:http://127.0.0.1:3500}
  client_id: ${OAUTH2_CLIENT_ID:abc123}
  client_secret: ${OAUTH2_CLIENT_SECRET:ssh-secret}
  request_scope: ${OAUTH2_REQUEST_SCOPE:api.write}
remote:
  api_url: ${REMOTE_API_URL:http://localhost:4000}
"#;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        warn!("config file {} not found, using environment defaults", path.display());
        DEFAULT_CONFIG_TEMPLATE.to_owned()
    };

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    if service_config
        .settings
        .pid_filename
        .as_ref()
        .is_some_and(|name| name.trim().is_empty())
    {
        service_config.settings.pid_filename = None;
    }

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("invalid config: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replaces `${VAR}` / `${VAR:default}`. A placeholder that is the whole
/// value of a key or list item is quoted when pasting it plain would change
/// what YAML reads, e.g. `s3cr3t #x` or `ab: cd`.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let value = std::env::var(var).unwrap_or_else(|_| default.to_string());
        let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
        if is_whole_scalar(input, start, end) {
            yaml_scalar(&value)
        } else {
            value
        }
    })
    .to_string()
}

fn is_whole_scalar(input: &str, start: usize, end: usize) -> bool {
    let line_start = input[..start].rfind('\n').map_or(0, |i| i + 1);
    let before = &input[line_start..start];
    let after = input[end..].split('\n').next().unwrap_or("");
    let key = before.trim_end();
    before.ends_with(char::is_whitespace) && (key.ends_with(':') || key.ends_with('-')) && after.trim().is_empty()
}

fn yaml_scalar(value: &str) -> String {
    if value.trim().is_empty() {
        return value.to_owned();
    }
    let reads_back = match serde_yaml::from_str::<serde_yaml::Value>(value) {
        Ok(serde_yaml::Value::String(parsed)) => parsed == value,
        Ok(serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_)) => !value.contains('#'),
        _ => false,
    };
    if reads_back {
        value.to_owned()
    } else {
        // a JSON string is a valid double-quoted YAML scalar
        serde_json::to_string(value).unwrap_or_else(|_| value.to_owned())
    }
}
