//! Payload types for the non-search endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tasks::TaskStatus;

/// One entry of `GET indexes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Page of `GET indexes`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IndexPage {
    pub results: Vec<IndexInfo>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub pkg_version: String,
    #[serde(default)]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub commit_date: Option<String>,
}

/// Body of `POST indexes/{uid}/documents/fetch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
}

impl DocumentsQuery {
    pub fn window(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_fields<F: Into<String>>(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Compiled filter expressions, e.g. from `Query::compile_filters`.
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentsPage {
    pub results: Vec<Value>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub total: u64,
}

/// Filters for `GET tasks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub index_uids: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    pub limit: Option<usize>,
    pub from: Option<u64>,
}

impl TaskFilter {
    pub fn for_index(index: impl Into<String>) -> Self {
        Self {
            index_uids: vec![index.into()],
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs; list filters are comma separated.
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.index_uids.is_empty() {
            pairs.push(("indexUids".to_string(), self.index_uids.join(",")));
        }
        if !self.statuses.is_empty() {
            let statuses: Vec<&str> = self.statuses.iter().map(TaskStatus::as_str).collect();
            pairs.push(("statuses".to_string(), statuses.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from".to_string(), from.to_string()));
        }
        pairs
    }
}
