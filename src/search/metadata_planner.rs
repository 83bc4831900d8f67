// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metadata query planning.
//!
//! A query built with `keep_facets_in_metadata` must filter its hits on
//! every clause while reporting, for each filtered column, the facet counts
//! that column would have without its own clause. That takes one main
//! request plus one companion request per filtered column:
//!
//! ```text
//! main:       filter = [category, (color)]      facets = caller's, minus metadata-only
//! companion:  filter = [(color)]                facets = [category]   limit = 1
//! companion:  filter = [category]               facets = [color]      limit = 1
//! ```
//!
//! Companion facet distributions are then layered over the main one.

use super::filter_translator::{CompileMode, FilterTranslator};
use super::query_builder::Query;
use super::request::SearchRequest;
use super::response::{SearchResponse, SearchResults};
use crate::error::ConnectorError;

/// Facet-count request for one filtered column.
#[derive(Debug, Clone, PartialEq)]
pub struct Companion {
    pub column: String,
    pub request: SearchRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub main: SearchRequest,
    pub companions: Vec<Companion>,
}

impl SearchPlan {
    pub fn len(&self) -> usize {
        1 + self.companions.len()
    }

    pub fn is_split(&self) -> bool {
        !self.companions.is_empty()
    }

    /// Main request first, then companions, each tagged with `index`.
    pub fn requests_for(&self, index: &str) -> Vec<SearchRequest> {
        std::iter::once(&self.main)
            .chain(self.companions.iter().map(|c| &c.request))
            .map(|request| request.clone().for_index(index))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataPlanner {
    translator: FilterTranslator,
}

impl MetadataPlanner {
    pub fn new(translator: FilterTranslator) -> Self {
        Self { translator }
    }

    /// Derive the main request and, for metadata-split queries, one
    /// companion per distinct filtered column.
    pub fn plan(&self, query: &Query) -> Result<SearchPlan, ConnectorError> {
        let compiled = self.translator.translate(query.wheres(), CompileMode::Normal)?;
        let mut main = SearchRequest::for_query(query, compiled.expressions);

        if !query.has_metadata_split() {
            return Ok(SearchPlan {
                main,
                companions: Vec::new(),
            });
        }

        let metadata_only = compiled.columns.metadata_only();
        main.facets.retain(|facet| !metadata_only.contains(facet));

        let companions = compiled
            .columns
            .all()
            .into_iter()
            .map(|column| {
                let filter = self
                    .translator
                    .translate(query.wheres(), CompileMode::ExcludeColumn(&column))?
                    .expressions;
                let request = SearchRequest {
                    index_uid: None,
                    q: query.search_text().to_string(),
                    filter,
                    sort: query.compile_order(),
                    facets: vec![column.clone()],
                    attributes_to_search_on: query.attributes_to_search_on().map(<[String]>::to_vec),
                    ..SearchRequest::default()
                }
                .window(0, 1);
                Ok(Companion { column, request })
            })
            .collect::<Result<Vec<_>, ConnectorError>>()?;

        Ok(SearchPlan { main, companions })
    }

    /// Main hits and pagination, with companion facets layered on top by
    /// facet name. Later companions win.
    pub fn merge(main: SearchResponse, companions: Vec<SearchResponse>) -> SearchResults {
        let mut results = SearchResults::from(main);
        for companion in companions {
            if let Some(distribution) = companion.facet_distribution {
                results.merge_facets(distribution);
            }
        }
        results
    }
}
