//! Search request payloads.
//!
//! One [`SearchRequest`] is one entry of a `multi-search` call or the body
//! of `POST indexes/{uid}/search`.

use serde::{Deserialize, Serialize};

use super::query_builder::Query;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Only serialized inside multi-search bodies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_uid: Option<String>,
    pub q: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_search_on: Option<Vec<String>>,
}

impl SearchRequest {
    /// Request for `query` with already compiled filters.
    ///
    /// Page mode wins when a page is set; hits per page then falls back to
    /// the query limit.
    pub fn for_query(query: &Query, filter: Vec<String>) -> Self {
        let request = Self {
            index_uid: None,
            q: query.search_text().to_string(),
            filter,
            sort: query.compile_order(),
            facets: query.facets().to_vec(),
            attributes_to_search_on: query.attributes_to_search_on().map(<[String]>::to_vec),
            ..Self::default()
        };
        match query.page() {
            Some(page) => request.paged(page, query.hits_per_page().unwrap_or(query.limit())),
            None => request.window(query.offset(), query.limit()),
        }
    }

    /// Switch to offset/limit pagination.
    pub fn window(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self.page = None;
        self.hits_per_page = None;
        self
    }

    /// Switch to page pagination, which yields exact totals.
    pub fn paged(mut self, page: usize, hits_per_page: usize) -> Self {
        self.page = Some(page);
        self.hits_per_page = Some(hits_per_page);
        self.offset = None;
        self.limit = None;
        self
    }

    /// Tag with the target index for a multi-search body.
    pub fn for_index(mut self, index: impl Into<String>) -> Self {
        self.index_uid = Some(index.into());
        self
    }
}

/// Body of `POST multi-search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSearchRequest {
    pub queries: Vec<SearchRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSearchRequest {
    pub facet_name: String,
    pub facet_query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query_builder::{QueryBuilder, WhereClauses};
    use serde_json::json;

    #[test]
    fn test_window_request_shape() {
        let query = QueryBuilder::new("products")
            .search("phone")
            .filter("brand", "=", "acme")
            .unwrap()
            .order_by_desc("price")
            .unwrap()
            .build()
            .unwrap();
        let request = SearchRequest::for_query(&query, query.compile_filters().unwrap());

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "q": "phone",
                "filter": ["'brand' = 'acme'"],
                "sort": ["price:desc"],
                "limit": 20,
                "offset": 0
            })
        );
    }

    #[test]
    fn test_page_mode_wins() {
        let query = QueryBuilder::new("products")
            .limit(7)
            .offset(3)
            .page(2)
            .build()
            .unwrap();
        let request = SearchRequest::for_query(&query, vec![]).for_index("products");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"indexUid": "products", "q": "", "page": 2, "hitsPerPage": 7})
        );
    }
}
