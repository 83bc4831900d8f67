// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Meili Connector
//!
//! Client-side query layer for Meilisearch-compatible search engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      QueryBuilder                           │
//! │  • Where-tree of leaves and AND/OR groups                  │
//! │  • Ordering, facets, pagination, random order              │
//! │  • keep_facets_in_metadata: per-column facet counts        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ build()
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Compilers and planners                      │
//! │  • FilterTranslator: where-tree → filter expressions       │
//! │  • OrderTranslator: order spec → "field:dir"               │
//! │  • MetadataPlanner: main request + facet companions        │
//! │  • RandomSampler: probe + distinct offset point queries    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Connector                            │
//! │  • Transport (HTTP via reqwest, or scripted in tests)      │
//! │  • Error mapping to ConnectorError                         │
//! │  • Retried reads, TaskPoller for queued writes             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meili_connector::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ConnectorError> {
//!     let connector = Connector::new(ConnectorConfig {
//!         host: "http://localhost:7700".into(),
//!         api_key: Some("masterKey".into()),
//!         ..Default::default()
//!     })?;
//!
//!     let task = connector.create_index("products", "id").await?;
//!     connector.wait_for_task(task).await?;
//!
//!     let query = connector
//!         .query("products")
//!         .search("phone")
//!         .filter("price", "<", 500)?
//!         .filter_group(|g| g.filter("brand", "=", "acme")?.or_filter("brand", "=", "globex"))?
//!         .order_by_desc("rating")?
//!         .build()?;
//!
//!     let results = connector.search(&query).await?;
//!     println!("{} of {:?} hits", results.len(), results.total_hits());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`search`]: query builder, compilers, planners and payloads
//! - [`connector`]: the [`Connector`] and its endpoint groups
//! - [`transport`]: the [`Transport`] seam and its implementations
//! - [`tasks`]: task snapshots and the [`TaskPoller`]
//! - [`resilience`]: retry with backoff for reads

pub mod config;
pub mod connector;
pub mod error;
pub mod metrics;
pub mod resilience;
pub mod search;
pub mod settings;
pub mod tasks;
pub mod transport;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use config::ConnectorConfig;
pub use connector::{Connector, DocumentsPage, DocumentsQuery, Health, IndexInfo, TaskFilter, Version};
pub use error::ConnectorError;
pub use metrics::LatencyTimer;
pub use resilience::retry::RetryConfig;
pub use search::{
    Direction, FacetHit, ListRendering, Operator, Paginated, Pagination, Query, QueryBuilder,
    SearchResults, WhereClauses,
};
pub use settings::{IndexSettings, DEFAULT_RANKING_RULES};
pub use tasks::{PollConfig, Task, TaskOutcome, TaskPoller, TaskStatus};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ScriptedTransport, Transport};

/// Everything needed to build and run queries.
pub mod prelude {
    pub use crate::config::ConnectorConfig;
    pub use crate::connector::Connector;
    pub use crate::error::ConnectorError;
    pub use crate::search::{Query, QueryBuilder, SearchResults, WhereClauses};
    pub use crate::tasks::{PollConfig, TaskOutcome};
}
