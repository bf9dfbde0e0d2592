//! # Telemetry Agent Library
//!
//! Collects mock sensor readings, authenticates with the OAuth2
//! client-credentials grant, and submits each reading to a remote data API,
//! retrying once with a fresh token when a cached one is rejected.
//!
//! Modules:
//! - `config`: service configuration, YAML loading and validation
//! - `cache`: single-slot credential cache
//! - `auth`: token acquisition against the authorization server
//! - `submission`: data POST and response interpretation
//! - `pipeline`: per-cycle context, two-attempt state machine, periodic driver
//! - `sensor`: mock reading generator

pub mod config;
pub mod cache;
pub mod auth;
pub mod submission;
pub mod pipeline;
pub mod sensor;
pub mod errors;
#[cfg(test)]
mod tests;
pub mod observability;
pub mod server;
pub mod helpers;
pub mod utils;


pub use crate::config::service::ServiceConfig;
pub use crate::errors::AgentError;
