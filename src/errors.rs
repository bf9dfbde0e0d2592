use thiserror::Error;

/// Failures surfaced by token acquisition and data submission.
///
/// A cache-served credential rejected with `401` is not listed here: the
/// submission step reports it as a retry request on the context instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Bad init input; `field` names the offending configuration key.
    #[error("configuration error: '{field}' {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Transport failure or request timeout.
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-200 from the token endpoint.
    #[error("{}", auth_server_message(.status, .status_text, .remote_body, .www_authenticate))]
    AuthServer {
        status: u16,
        status_text: String,
        remote_body: String,
        www_authenticate: Option<String>,
    },

    /// Non-2xx from the data endpoint (other than the recoverable cached-token 401).
    #[error("submission rejected: {status} {status_text}: {remote_body}")]
    Submission {
        status: u16,
        status_text: String,
        remote_body: String,
    },

    /// 2xx response whose body could not be decoded.
    #[error("malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },
}

impl AgentError {
    pub fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        AgentError::Configuration { field, reason: reason.into() }
    }

    pub fn network(err: reqwest::Error, timeout_secs: u64) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out after {}s: {}", timeout_secs, err)
        } else {
            err.to_string()
        };
        AgentError::Network { message }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AgentError::AuthServer { status, .. } | AgentError::Submission { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Configuration { .. } => "configuration",
            AgentError::Network { .. } => "network",
            AgentError::AuthServer { .. } => "auth_server",
            AgentError::Submission { .. } => "submission",
            AgentError::MalformedResponse { .. } => "malformed_response",
        }
    }
}

fn auth_server_message(
    status: &u16,
    status_text: &str,
    remote_body: &str,
    www_authenticate: &Option<String>,
) -> String {
    let mut message = format!("authorization server returned {} {}", status, status_text);
    if !remote_body.is_empty() {
        message.push_str(&format!(": {}", remote_body));
    }
    if let Some(challenge) = www_authenticate {
        message.push_str(&format!(" (WWW-Authenticate: {})", challenge));
    }
    message
}
