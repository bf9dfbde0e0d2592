use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::cache::credential::Credential;
use crate::helpers::time::now_i64;

/// Single-slot credential cache shared by every cycle of one process.
///
/// Owned by the composition root and handed to the token provider; clones
/// share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CredentialCache {
    inner: Arc<Mutex<Option<Credential>>>,
}

/// Exclusive access to the slot. Held for the whole check-refresh-store
/// sequence so only one refresh is in flight at a time.
pub struct CacheSlot<'a> {
    guard: MutexGuard<'a, Option<Credential>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(None)) }
    }

    pub async fn lock(&self) -> CacheSlot<'_> {
        CacheSlot { guard: self.inner.lock().await }
    }

    /// Current entry regardless of expiry
    pub async fn peek(&self) -> Option<Credential> {
        self.inner.lock().await.clone()
    }

    /// Replace the entry
    pub async fn set(&self, credential: Credential) {
        self.lock().await.store(credential);
    }

    pub async fn clear(&self) {
        self.lock().await.clear();
    }
}

impl CacheSlot<'_> {
    /// Returns the cached credential if it passes the margin check.
    /// An entry failing the check is dropped.
    pub fn usable(&mut self, margin_seconds: i64) -> Option<Credential> {
        let now = now_i64();
        match self.guard.as_ref() {
            Some(credential) if credential.is_usable_at(now, margin_seconds) => {
                Some(credential.clone().tagged(true))
            }
            Some(credential) => {
                debug!(
                    expires_at = credential.expires_at_unix_ts,
                    now, margin_seconds, "cached credential inside expiry margin, dropping"
                );
                *self.guard = None;
                None
            }
            None => None,
        }
    }

    pub fn clear(&mut self) {
        *self.guard = None;
    }

    pub fn store(&mut self, credential: Credential) {
        *self.guard = Some(credential.tagged(true));
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_none()
    }
}
