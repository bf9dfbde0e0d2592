/// Bearer credential issued by the authorization server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at_unix_ts: i64, // UNIX TIMESTAMP
    /// true when handed out from the cache, false when freshly minted
    pub served_from_cache: bool,
}

impl Credential {
    pub fn new(access_token: String, expires_at_unix_ts: i64) -> Self {
        Self { access_token, expires_at_unix_ts, served_from_cache: false }
    }

    /// Usable while `expires_at >= now + margin`.
    pub fn is_usable_at(&self, now: i64, margin_seconds: i64) -> bool {
        self.expires_at_unix_ts >= now + margin_seconds
    }

    pub fn tagged(mut self, served_from_cache: bool) -> Self {
        self.served_from_cache = served_from_cache;
        self
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_boundary_is_inclusive() {
        let credential = Credential::new("tok".into(), 1_000);
        assert!(credential.is_usable_at(990, 10));
        assert!(!credential.is_usable_at(991, 10));
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(Credential::new("tok-A".into(), 0).bearer(), "Bearer tok-A");
    }
}
