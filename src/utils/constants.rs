//! Shared constants and invariants

/// A cached credential is reused only while it stays valid this long.
pub const EXPIRY_MARGIN_SECS: i64 = 10;
pub const TOKEN_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const SUBMISSION_TIMEOUT_SECS: u64 = 10;

pub const TOKEN_PATH: &str = "/oauth/token";
pub const IOT_DATA_PATH: &str = "/v1/data/iot-data/";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

pub const DEFAULT_CONFIG_PATH: &str = "telemetry-agent.yaml";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_DEVICE_ID: &str = "iot-device-12";
