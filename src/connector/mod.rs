// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connector facade.
//!
//! The [`Connector`] ties the pieces together:
//! - query compilation and metadata planning for searches
//! - random sampling
//! - index, document and settings endpoints
//! - task tracking through [`TaskPoller`]
//!
//! # Example
//!
//! ```rust,no_run
//! use meili_connector::{Connector, ConnectorConfig, WhereClauses};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), meili_connector::ConnectorError> {
//! let connector = Connector::new(ConnectorConfig::for_host("http://localhost:7700"))?;
//!
//! let query = connector
//!     .query("products")
//!     .filter("category", "=", "phones")?
//!     .keep_facets_in_metadata(|q| q.filter("color", "=", "black"))?
//!     .set_facets(["category", "color"])
//!     .build()?;
//!
//! let results = connector.search(&query).await?;
//! println!("{} hits, colors: {:?}", results.len(), results.facet("color"));
//! # Ok(())
//! # }
//! ```

mod document_api;
mod index_api;
mod search_api;
mod settings_api;
mod system_api;
mod types;

pub use types::{DocumentsPage, DocumentsQuery, Health, IndexInfo, TaskFilter, Version};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::metrics;
use crate::resilience::retry::{retry_if, RetryConfig};
use crate::search::{FilterTranslator, QueryBuilder};
use crate::tasks::{Task, TaskPoller};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Client for a Meilisearch-compatible engine.
///
/// Cheap to share behind an `Arc`; every call owns its own request state.
pub struct Connector {
    transport: Arc<dyn Transport>,
    config: ConnectorConfig,
    translator: FilterTranslator,
    retry: RetryConfig,
}

impl Connector {
    /// Connector over HTTP. Fails with [`ConnectorError::NoHostGiven`]
    /// when the config has no host.
    pub fn new(config: ConnectorConfig) -> Result<Self, ConnectorError> {
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Connector over any transport.
    pub fn with_transport(config: ConnectorConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            translator: FilterTranslator::new(config.list_rendering),
            retry: config.retry_config(),
            transport,
            config,
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn translator(&self) -> FilterTranslator {
        self.translator
    }

    /// New query on `index` with the configured default limit.
    pub fn query(&self, index: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(index).limit(self.config.default_limit)
    }

    /// Poller with the configured cadence.
    pub fn poller(&self) -> TaskPoller {
        TaskPoller::new(self.config.poll_config())
    }

    /// Send once; non-2xx becomes an error.
    async fn execute(
        &self,
        operation: &str,
        request: ApiRequest,
    ) -> Result<ApiResponse, ConnectorError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let code = response
            .error_parts()
            .map(|(code, _)| code)
            .unwrap_or_else(|| "unknown".to_string());
        warn!(%method, %path, status = response.status, %code, "Engine returned an error");
        metrics::record_api_error(operation, &code);
        Err(ConnectorError::from_response(&response))
    }

    /// Like `execute`, retrying idempotent reads on transient failures.
    async fn send(
        &self,
        operation: &str,
        request: ApiRequest,
    ) -> Result<ApiResponse, ConnectorError> {
        if !request.method.is_idempotent_read() {
            return self.execute(operation, request).await;
        }
        retry_if(
            operation,
            &self.retry,
            |err: &ConnectorError| {
                let transient = err.is_transient();
                if transient {
                    metrics::record_retry(operation);
                }
                transient
            },
            || self.execute(operation, request.clone()),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: String,
    ) -> Result<T, ConnectorError> {
        self.send(operation, ApiRequest::get(path)).await?.decode()
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        path: String,
        body: Value,
    ) -> Result<T, ConnectorError> {
        self.send(operation, ApiRequest::new(method, path).with_body(body))
            .await?
            .decode()
    }

    /// Issue a write and decode the task summary the engine answers with.
    async fn enqueue(
        &self,
        operation: &str,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<Task, ConnectorError> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.send(operation, request).await?.decode()
    }
}
