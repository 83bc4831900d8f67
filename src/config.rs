//! Configuration for the connector.
//!
//! # Example
//!
//! ```
//! use meili_connector::ConnectorConfig;
//!
//! // Minimal config (uses defaults)
//! let config = ConnectorConfig::default();
//! assert_eq!(config.request_timeout_ms, 30_000);
//! assert!(config.multi_search);
//!
//! // Full config
//! let config = ConnectorConfig {
//!     host: "http://localhost:7700".into(),
//!     api_key: Some("masterKey".into()),
//!     multi_search: false,
//!     poll_interval_ms: 1000,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;
use std::time::Duration;

use crate::resilience::retry::RetryConfig;
use crate::search::ListRendering;
use crate::tasks::PollConfig;

/// Configuration for the connector.
///
/// Only `host` is required in practice; everything else has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    /// Engine base URL (e.g., "http://localhost:7700")
    #[serde(default)]
    pub host: String,

    /// Bearer token; empty or absent means no key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Batch metadata companions and random point queries into one multi-search call
    #[serde(default = "default_multi_search")]
    pub multi_search: bool,

    /// How list values for IN / NOT IN render
    #[serde(default)]
    pub list_rendering: ListRendering,

    /// Limit for queries created through `Connector::query`
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Task polling
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,
    #[serde(default = "default_poll_backoff_factor")]
    pub poll_backoff_factor: f64,
    #[serde(default = "default_poll_max_wait_ms")]
    pub poll_max_wait_ms: u64,
    #[serde(default)]
    pub poll_max_attempts: Option<usize>,

    /// Retry for idempotent reads
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_request_timeout_ms() -> u64 { 30_000 }
fn default_multi_search() -> bool { true }
fn default_limit() -> usize { crate::search::DEFAULT_LIMIT }
fn default_poll_interval_ms() -> u64 { 250 }
fn default_poll_max_interval_ms() -> u64 { 5_000 }
fn default_poll_backoff_factor() -> f64 { 2.0 }
fn default_poll_max_wait_ms() -> u64 { 300_000 } // 5 minutes
fn default_retry_max_attempts() -> usize { 3 }
fn default_retry_initial_delay_ms() -> u64 { 100 }
fn default_retry_max_delay_ms() -> u64 { 2_000 }

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: None,
            request_timeout_ms: default_request_timeout_ms(),
            multi_search: default_multi_search(),
            list_rendering: ListRendering::default(),
            default_limit: default_limit(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
            poll_backoff_factor: default_poll_backoff_factor(),
            poll_max_wait_ms: default_poll_max_wait_ms(),
            poll_max_attempts: None,
            retry_max_attempts: default_retry_max_attempts(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl ConnectorConfig {
    /// Config for `host` with defaults elsewhere.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            initial_interval: Duration::from_millis(self.poll_interval_ms),
            max_interval: Duration::from_millis(self.poll_max_interval_ms),
            backoff_factor: self.poll_backoff_factor,
            max_wait: Duration::from_millis(self.poll_max_wait_ms),
            max_attempts: self.poll_max_attempts,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            factor: 2.0,
            max_attempts: self.retry_max_attempts,
        }
    }
}
