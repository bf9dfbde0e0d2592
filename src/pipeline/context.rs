use serde_json::Value;

use crate::cache::credential::Credential;
use crate::sensor::generator::SensorReading;

/// Switches that steer one pass through `acquire → submit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOptions {
    /// skip credential acquisition entirely
    pub ignore_token_request: bool,
    /// bypass the cache and always refresh
    pub force_new_token: bool,
    /// skip the data POST
    pub ignore_submission: bool,
}

/// Per-cycle state. Created fresh for every reading and dropped when the
/// cycle ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub payload: SensorReading,
    pub credential: Option<Credential>,
    pub options: CycleOptions,
    /// record echoed back by the data API after a successful submission
    pub created_record: Option<Value>,
}

impl RequestContext {
    pub fn new(payload: SensorReading) -> Self {
        Self::with_options(payload, CycleOptions::default())
    }

    pub fn with_options(payload: SensorReading, options: CycleOptions) -> Self {
        Self { payload, credential: None, options, created_record: None }
    }

    /// Set by the coordinator when a cache-served credential was rejected.
    pub fn wants_fresh_token(&self) -> bool {
        self.options.force_new_token && !self.options.ignore_submission && self.credential.is_none()
    }
}
