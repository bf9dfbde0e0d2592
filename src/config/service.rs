use serde::Deserialize;
use crate::config::settings::SettingsConfig;


/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub oauth2: OAuth2Config,
    pub remote: RemoteConfig,
}

/// ================================
/// Authorization server
/// ================================
/// Raw section as read from YAML. Checked once by `TokenProvider::init`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OAuth2Config {
    pub auth_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub request_scope: Option<ScopeValue>,
}

/// `request_scope: api.write` or `request_scope: [api.read, api.write]`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScopeValue {
    One(String),
    Many(Vec<String>),
}

/// ================================
/// Remote data API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub api_url: String,
}
