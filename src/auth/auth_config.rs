use std::fmt;

use crate::config::service::{OAuth2Config, ScopeValue};
use crate::errors::AgentError;

/// Validated client-credentials settings. Built once, read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub authorization_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub requested_scopes: Vec<String>,
}

impl AuthConfig {
    /// Wire form of the scopes: space-joined, in configured order.
    pub fn scope_string(&self) -> String {
        self.requested_scopes.join(" ")
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("authorization_url", &self.authorization_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("requested_scopes", &self.requested_scopes)
            .finish()
    }
}

impl TryFrom<&OAuth2Config> for AuthConfig {
    type Error = AgentError;

    fn try_from(raw: &OAuth2Config) -> Result<Self, Self::Error> {
        let authorization_url = required("auth_url", raw.auth_url.as_deref())?
            .trim_end_matches('/')
            .to_string();
        let client_id = required("client_id", raw.client_id.as_deref())?.to_string();
        let client_secret = required("client_secret", raw.client_secret.as_deref())?.to_string();
        let requested_scopes = scopes(raw.request_scope.as_ref())?;

        Ok(Self { authorization_url, client_id, client_secret, requested_scopes })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, AgentError> {
    match value.map(str::trim) {
        None => Err(AgentError::configuration(field, "is missing")),
        Some("") => Err(AgentError::configuration(field, "must not be empty")),
        Some(value) => Ok(value),
    }
}

fn scopes(value: Option<&ScopeValue>) -> Result<Vec<String>, AgentError> {
    const FIELD: &str = "request_scope";
    match value {
        None => Err(AgentError::configuration(FIELD, "is missing")),
        Some(ScopeValue::One(scope)) => {
            let scopes: Vec<String> = scope.split_whitespace().map(str::to_owned).collect();
            if scopes.is_empty() {
                return Err(AgentError::configuration(FIELD, "must not be empty"));
            }
            Ok(scopes)
        }
        Some(ScopeValue::Many(list)) => {
            if list.is_empty() {
                return Err(AgentError::configuration(FIELD, "must contain at least one scope"));
            }
            if list.iter().any(|scope| scope.trim().is_empty()) {
                return Err(AgentError::configuration(FIELD, "must not contain empty scopes"));
            }
            Ok(list.iter().map(|scope| scope.trim().to_owned()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> OAuth2Config {
        OAuth2Config {
            auth_url: Some("http://127.0.0.1:3500/".into()),
            client_id: Some("abc123".into()),
            client_secret: Some("ssh-secret".into()),
            request_scope: Some(ScopeValue::One("api.write".into())),
        }
    }

    fn field_of(err: AgentError) -> &'static str {
        match err {
            AgentError::Configuration { field, .. } => field,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_scope_string_and_trims_url() {
        let config = AuthConfig::try_from(&raw()).unwrap();
        assert_eq!(config.authorization_url, "http://127.0.0.1:3500");
        assert_eq!(config.requested_scopes, vec!["api.write"]);
    }

    #[test]
    fn accepts_ordered_scope_list() {
        let mut raw = raw();
        raw.request_scope = Some(ScopeValue::Many(vec!["api.read".into(), "api.write".into()]));
        let config = AuthConfig::try_from(&raw).unwrap();
        assert_eq!(config.scope_string(), "api.read api.write");
    }

    #[test]
    fn rejects_each_missing_or_empty_field_by_name() {
        let mut r = raw();
        r.auth_url = None;
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "auth_url");

        let mut r = raw();
        r.client_id = Some("   ".into());
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "client_id");

        let mut r = raw();
        r.client_secret = Some(String::new());
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "client_secret");

        let mut r = raw();
        r.request_scope = Some(ScopeValue::Many(vec![]));
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "request_scope");

        let mut r = raw();
        r.request_scope = Some(ScopeValue::Many(vec!["api.read".into(), "".into()]));
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "request_scope");

        let mut r = raw();
        r.request_scope = Some(ScopeValue::One("".into()));
        assert_eq!(field_of(AuthConfig::try_from(&r).unwrap_err()), "request_scope");
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = AuthConfig::try_from(&raw()).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ssh-secret"));
    }
}
