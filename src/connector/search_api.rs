// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search API for Connector
//!
//! # Dispatch
//!
//! ```text
//! search(query)
//!       │
//!       ├─→ random order?  probe ─→ draw offsets ─→ point queries
//!       │
//!       ├─→ plan (MetadataPlanner)
//!       │        │
//!       │        └─→ no companions? single POST indexes/{uid}/search
//!       │
//!       └─→ split: main + companions
//!                ├─→ multi_search on:  one POST multi-search
//!                └─→ multi_search off: one POST per request, in order
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::error::ConnectorError;
use crate::metrics::{self, LatencyTimer};
use crate::search::{
    FacetHit, FacetSearchRequest, FacetSearchResponse, MetadataPlanner,
    MultiSearchRequest, MultiSearchResponse, Paginated, Pagination, Query, RandomSampler,
    SearchRequest, SearchResponse, SearchResults,
};
use crate::transport::Method;

use super::Connector;

impl Connector {
    // ═══════════════════════════════════════════════════════════════════════════
    // Search API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run a built query.
    ///
    /// Plain queries take one request. Metadata-split queries take one main
    /// request plus one companion per filtered column, batched into a single
    /// multi-search call unless that is disabled. Random-order queries are
    /// routed to [`Connector::search_random_with`] with an entropy-seeded rng.
    #[instrument(skip(self, query), fields(index = %query.index()))]
    pub async fn search(&self, query: &Query) -> Result<SearchResults, ConnectorError> {
        if query.is_random_order() {
            let mut rng = StdRng::from_entropy();
            return self.search_random_with(query, &mut rng).await;
        }

        let plan = MetadataPlanner::new(self.translator).plan(query)?;
        let kind = if plan.is_split() { "split" } else { "single" };
        let _timer = LatencyTimer::new(kind);

        let result = if plan.is_split() {
            metrics::record_companion_queries(plan.companions.len());
            debug!(companions = plan.companions.len(), "Dispatching metadata-split search");
            self.dispatch(query.index(), plan.requests_for(query.index()))
                .await
                .and_then(|responses| {
                    let mut responses = responses.into_iter();
                    let main = responses.next().ok_or_else(|| {
                        ConnectorError::Decode("empty multi-search response".into())
                    })?;
                    Ok(MetadataPlanner::merge(main, responses.collect()))
                })
        } else {
            self.search_one(query.index(), &plan.main)
                .await
                .map(SearchResults::from)
        };

        metrics::record_search(kind, if result.is_ok() { "success" } else { "error" });
        result
    }

    /// Random sample of `query.limit()` distinct matches.
    ///
    /// Probes the exact match count, draws distinct offsets with `rng`, then
    /// fetches one hit per offset. Hits come back in draw order. Fails with
    /// [`ConnectorError::NotEnoughDocumentsToOrderRandomly`] when fewer
    /// documents match than were requested.
    #[instrument(skip(self, query, rng), fields(index = %query.index(), requested = query.limit()))]
    pub async fn search_random_with<R: Rng + Send + ?Sized>(
        &self,
        query: &Query,
        rng: &mut R,
    ) -> Result<SearchResults, ConnectorError> {
        let requested = query.limit();
        if requested == 0 {
            return Ok(SearchResults::default());
        }

        let _timer = LatencyTimer::new("random");
        let result = self.sample(query, requested, rng).await;
        metrics::record_search("random", if result.is_ok() { "success" } else { "error" });
        result
    }

    async fn sample<R: Rng + Send + ?Sized>(
        &self,
        query: &Query,
        requested: usize,
        rng: &mut R,
    ) -> Result<SearchResults, ConnectorError> {
        let filter = query.compile_filters_with(&self.translator)?;

        let probe = self
            .search_one(query.index(), &RandomSampler::probe(query, filter.clone()))
            .await?;
        let total = probe.total_hits();
        RandomSampler::ensure_enough(total, requested)?;

        let offsets = RandomSampler::draw_offsets(total, requested, rng);
        debug!(total, ?offsets, "Drew random offsets");
        let points = RandomSampler::point_queries(query, &filter, &offsets);
        let responses = self.dispatch(query.index(), points).await?;
        metrics::record_random_round_trips(requested + 1);

        let mut results = SearchResults {
            total_hits: Some(total),
            processing_time_ms: probe.processing_time_ms,
            ..SearchResults::default()
        };
        for response in responses {
            results.processing_time_ms += response.processing_time_ms;
            results.hits.extend(response.hits);
        }
        Ok(results)
    }

    /// Run several independent queries in one multi-search call.
    ///
    /// Each query contributes its main request only: metadata companions and
    /// random ordering are not applied here. Results come back in query order.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn multi_search(&self, queries: &[Query]) -> Result<Vec<SearchResults>, ConnectorError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let _timer = LatencyTimer::new("multi");

        let requests = queries
            .iter()
            .map(|query| {
                let filter = query.compile_filters_with(&self.translator)?;
                Ok(SearchRequest::for_query(query, filter).for_index(query.index()))
            })
            .collect::<Result<Vec<_>, ConnectorError>>()?;

        let result = self.multi_search_raw(requests).await;
        metrics::record_search("multi", if result.is_ok() { "success" } else { "error" });
        Ok(result?.into_iter().map(SearchResults::from).collect())
    }

    /// One page of `query` in page mode, with exact totals.
    ///
    /// `page` is 1-based; 0 is treated as 1. Metadata splitting still
    /// applies. Random ordering is ignored.
    pub async fn paginate(
        &self,
        query: &Query,
        page: usize,
        per_page: usize,
    ) -> Result<Paginated, ConnectorError> {
        let mut paged = query.clone();
        paged.page = Some(page.max(1));
        paged.hits_per_page = Some(per_page);
        paged.random_order = false;

        let results = self.search(&paged).await?;
        let (current_page, per_page, total, total_pages) = match results.pagination {
            Some(Pagination::Paged {
                page,
                hits_per_page,
                total_pages,
                total_hits,
            }) => (page, hits_per_page, total_hits, total_pages),
            _ => (
                page.max(1),
                per_page,
                results.total_hits.unwrap_or(0),
                0,
            ),
        };

        Ok(Paginated {
            items: results.hits,
            current_page,
            per_page,
            total,
            total_pages,
        })
    }

    /// Values of `facet` matching `facet_query`, with counts.
    #[instrument(skip(self))]
    pub async fn facet_search(
        &self,
        index: &str,
        facet: &str,
        facet_query: &str,
    ) -> Result<Vec<FacetHit>, ConnectorError> {
        let _timer = LatencyTimer::new("facet");
        let body = serde_json::to_value(FacetSearchRequest {
            facet_name: facet.to_string(),
            facet_query: facet_query.to_string(),
        })?;
        let result: Result<FacetSearchResponse, _> = self
            .send_json(
                "facet_search",
                Method::Post,
                format!("indexes/{}/facet-search", index),
                body,
            )
            .await;
        metrics::record_search("facet", if result.is_ok() { "success" } else { "error" });
        Ok(result?.facet_hits)
    }

    async fn search_one(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ConnectorError> {
        self.send_json(
            "search",
            Method::Post,
            format!("indexes/{}/search", index),
            serde_json::to_value(request)?,
        )
        .await
    }

    async fn multi_search_raw(
        &self,
        queries: Vec<SearchRequest>,
    ) -> Result<Vec<SearchResponse>, ConnectorError> {
        let expected = queries.len();
        let body = serde_json::to_value(MultiSearchRequest { queries })?;
        let response: MultiSearchResponse = self
            .send_json("multi_search", Method::Post, "multi-search".to_string(), body)
            .await?;
        if response.results.len() != expected {
            return Err(ConnectorError::Decode(format!(
                "multi-search returned {} results for {} queries",
                response.results.len(),
                expected
            )));
        }
        Ok(response.results)
    }

    /// Send `requests` against `index` as one multi-search call, or one by
    /// one when batching is off. Responses keep request order.
    async fn dispatch(
        &self,
        index: &str,
        requests: Vec<SearchRequest>,
    ) -> Result<Vec<SearchResponse>, ConnectorError> {
        if self.config.multi_search && requests.len() > 1 {
            let tagged = requests
                .into_iter()
                .map(|request| request.for_index(index))
                .collect();
            return self.multi_search_raw(tagged).await;
        }

        let mut responses = Vec::with_capacity(requests.len());
        for mut request in requests {
            request.index_uid = None;
            responses.push(self.search_one(index, &request).await?);
        }
        Ok(responses)
    }
}
