//! Uniform random sampling over a filtered result set.
//!
//! The engine has no random sort, so a sample of `n` documents costs
//! `n + 1` round trips (or two HTTP calls when multi-search batching is
//! on): one probe for the exact match count, then one single-hit query per
//! drawn offset.

use rand::seq::index;
use rand::Rng;

use super::query_builder::Query;
use super::request::SearchRequest;
use crate::error::ConnectorError;

pub struct RandomSampler;

impl RandomSampler {
    /// Single-hit page-mode request; page mode makes `totalHits` exact.
    pub fn probe(query: &Query, filter: Vec<String>) -> SearchRequest {
        SearchRequest {
            q: query.search_text().to_string(),
            filter,
            attributes_to_search_on: query.attributes_to_search_on().map(<[String]>::to_vec),
            ..SearchRequest::default()
        }
        .paged(1, 1)
    }

    pub fn ensure_enough(total: u64, requested: usize) -> Result<(), ConnectorError> {
        if total < requested as u64 {
            return Err(ConnectorError::NotEnoughDocumentsToOrderRandomly {
                found: total,
                requested,
            });
        }
        Ok(())
    }

    /// `requested` distinct offsets drawn uniformly from `[0, total)`.
    pub fn draw_offsets<R: Rng + ?Sized>(total: u64, requested: usize, rng: &mut R) -> Vec<usize> {
        let total = usize::try_from(total).unwrap_or(usize::MAX);
        index::sample(rng, total, requested.min(total)).into_vec()
    }

    /// One `limit = 1` request per offset, in draw order.
    pub fn point_queries(query: &Query, filter: &[String], offsets: &[usize]) -> Vec<SearchRequest> {
        offsets
            .iter()
            .map(|&offset| {
                SearchRequest {
                    q: query.search_text().to_string(),
                    filter: filter.to_vec(),
                    attributes_to_search_on: query
                        .attributes_to_search_on()
                        .map(<[String]>::to_vec),
                    ..SearchRequest::default()
                }
                .window(offset, 1)
            })
            .collect()
    }
}
