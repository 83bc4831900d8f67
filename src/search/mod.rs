// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Structured queries compiled to the engine's filter and sort grammar.
//!
//! # Architecture
//!
//! ```text
//! QueryBuilder (where-tree AST)
//!     ↓ build()
//! Query
//!     ├─→ FilterTranslator   → ["'col' = 'v'", "('a' = 1 OR 'b' = 2)"]
//!     ├─→ OrderTranslator    → ["price:desc"]
//!     ├─→ MetadataPlanner    → main request + facet companions
//!     └─→ RandomSampler      → probe + point queries
//! ```
//!
//! # Filter Language
//!
//! ```text
//! 'price' > 10                     - Comparison
//! 'color' IN ['black','white']     - Membership
//! 'color' NOT IN ['red']           - Negated membership
//! 'brand' IS EMPTY                 - Unary check
//! ('a' = 1 OR 'b' = 2)             - Group
//! ```

mod filter_translator;
mod metadata_planner;
mod order_translator;
mod query_builder;
mod random_sampler;
mod request;
mod response;

pub use filter_translator::{
    quote, CompileMode, CompiledFilters, FilterColumns, FilterTranslator, ListRendering,
};
pub use metadata_planner::{Companion, MetadataPlanner, SearchPlan};
pub use order_translator::OrderTranslator;
pub use query_builder::{
    ClauseBuilder, Connective, Direction, FilterValue, GroupBuilder, Operator, OrderEntry,
    OrderSpec, Query, QueryBuilder, Scalar, WhereClauses, WhereGroup, WhereLeaf, WhereNode,
    DEFAULT_LIMIT,
};
pub use random_sampler::RandomSampler;
pub use request::{FacetSearchRequest, MultiSearchRequest, SearchRequest};
pub use response::{
    FacetDistribution, FacetHit, FacetSearchResponse, MultiSearchResponse, Paginated, Pagination,
    SearchResponse, SearchResults,
};
