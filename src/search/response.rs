//! Decoded search responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ConnectorError;

/// Facet name -> facet value -> document count
pub type FacetDistribution = BTreeMap<String, BTreeMap<String, u64>>;

/// Pagination metadata echoed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `offset`/`limit` mode; the total is an estimate
    Window {
        offset: usize,
        limit: usize,
        estimated_total_hits: u64,
    },
    /// `page`/`hitsPerPage` mode; the total is exact
    Paged {
        page: usize,
        hits_per_page: usize,
        total_pages: usize,
        total_hits: u64,
    },
}

impl Pagination {
    pub fn total_hits(&self) -> u64 {
        match self {
            Self::Window {
                estimated_total_hits,
                ..
            } => *estimated_total_hits,
            Self::Paged { total_hits, .. } => *total_hits,
        }
    }

    pub fn has_next_page(&self) -> bool {
        match self {
            Self::Window { .. } => false,
            Self::Paged {
                page, total_pages, ..
            } => page < total_pages,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchResponse {
    #[serde(default)]
    index_uid: Option<String>,
    #[serde(default)]
    hits: Vec<Value>,
    #[serde(default)]
    query: String,
    #[serde(default)]
    processing_time_ms: u64,
    #[serde(default)]
    facet_distribution: Option<FacetDistribution>,
    offset: Option<usize>,
    limit: Option<usize>,
    estimated_total_hits: Option<u64>,
    page: Option<usize>,
    hits_per_page: Option<usize>,
    total_pages: Option<usize>,
    total_hits: Option<u64>,
}

/// One search result as returned by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSearchResponse")]
pub struct SearchResponse {
    pub index_uid: Option<String>,
    pub hits: Vec<Value>,
    pub query: String,
    pub processing_time_ms: u64,
    pub facet_distribution: Option<FacetDistribution>,
    pub pagination: Pagination,
}

impl From<RawSearchResponse> for SearchResponse {
    fn from(raw: RawSearchResponse) -> Self {
        let pagination = match raw.page {
            Some(page) => Pagination::Paged {
                page,
                hits_per_page: raw.hits_per_page.unwrap_or(raw.hits.len()),
                total_pages: raw.total_pages.unwrap_or(0),
                total_hits: raw
                    .total_hits
                    .or(raw.estimated_total_hits)
                    .unwrap_or(0),
            },
            None => Pagination::Window {
                offset: raw.offset.unwrap_or(0),
                limit: raw.limit.unwrap_or(raw.hits.len()),
                estimated_total_hits: raw
                    .estimated_total_hits
                    .or(raw.total_hits)
                    .unwrap_or(0),
            },
        };
        Self {
            index_uid: raw.index_uid,
            hits: raw.hits,
            query: raw.query,
            processing_time_ms: raw.processing_time_ms,
            facet_distribution: raw.facet_distribution,
            pagination,
        }
    }
}

impl SearchResponse {
    pub fn total_hits(&self) -> u64 {
        self.pagination.total_hits()
    }
}

/// Body of a `multi-search` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiSearchResponse {
    pub results: Vec<SearchResponse>,
}

/// Search outcome handed back to callers.
///
/// For plain and metadata-split searches this mirrors the main response
/// with companion facets merged in. For random samples `pagination` is
/// `None` and `total_hits` is the probed match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub hits: Vec<Value>,
    pub total_hits: Option<u64>,
    pub pagination: Option<Pagination>,
    pub facet_distribution: FacetDistribution,
    pub processing_time_ms: u64,
}

impl From<SearchResponse> for SearchResults {
    fn from(response: SearchResponse) -> Self {
        Self {
            hits: response.hits,
            total_hits: Some(response.pagination.total_hits()),
            pagination: Some(response.pagination),
            facet_distribution: response.facet_distribution.unwrap_or_default(),
            processing_time_ms: response.processing_time_ms,
        }
    }
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn total_hits(&self) -> Option<u64> {
        self.total_hits
    }

    /// Only page-mode results can report a next page.
    pub fn has_next_page(&self) -> bool {
        self.pagination
            .map(|p| p.has_next_page())
            .unwrap_or(false)
    }

    pub fn facet(&self, name: &str) -> Option<&BTreeMap<String, u64>> {
        self.facet_distribution.get(name)
    }

    /// Layer `distribution` over the current facets, replacing whole facets
    /// by name.
    pub fn merge_facets(&mut self, distribution: FacetDistribution) {
        for (facet, values) in distribution {
            self.facet_distribution.insert(facet, values);
        }
    }

    /// Decode hits into a caller type.
    pub fn hits_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, ConnectorError> {
        self.hits
            .iter()
            .map(|hit| serde_json::from_value(hit.clone()).map_err(ConnectorError::from))
            .collect()
    }
}

/// One page of results, as returned by `Connector::paginate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    pub items: Vec<Value>,
    pub current_page: usize,
    pub per_page: usize,
    pub total: u64,
    pub total_pages: usize,
}

impl Paginated {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetHit {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSearchResponse {
    pub facet_hits: Vec<FacetHit>,
    #[serde(default)]
    pub facet_query: Option<String>,
    #[serde(default)]
    pub processing_time_ms: u64,
}
