//! Document endpoints for Connector

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::ConnectorError;
use crate::search::Query;
use crate::tasks::Task;
use crate::transport::{ApiRequest, Method};

use super::types::{DocumentsPage, DocumentsQuery};
use super::Connector;

impl Connector {
    // ═══════════════════════════════════════════════════════════════════════════
    // Documents API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add or replace documents. The engine infers the primary key when the
    /// index has none.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn add_documents<T: Serialize + Sync>(
        &self,
        index: &str,
        documents: &[T],
    ) -> Result<Task, ConnectorError> {
        let body = serde_json::to_value(documents)?;
        self.enqueue(
            "add_documents",
            Method::Post,
            format!("indexes/{}/documents", index),
            Some(body),
        )
        .await
    }

    /// Browse documents, optionally filtered.
    ///
    /// Any rejection of the browse parameters surfaces as
    /// [`ConnectorError::InvalidParameter`].
    pub async fn get_documents(
        &self,
        index: &str,
        query: &DocumentsQuery,
    ) -> Result<DocumentsPage, ConnectorError> {
        let request = ApiRequest::new(Method::Post, format!("indexes/{}/documents/fetch", index))
            .with_body(serde_json::to_value(query)?);
        match self.send("get_documents", request).await {
            Ok(response) => response.decode(),
            Err(ConnectorError::Api { status, message, .. }) if (400..500).contains(&status) => {
                Err(ConnectorError::InvalidParameter(message))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get_document<T: DeserializeOwned>(
        &self,
        index: &str,
        id: &str,
    ) -> Result<T, ConnectorError> {
        self.get_json("get_document", format!("indexes/{}/documents/{}", index, id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<Task, ConnectorError> {
        self.enqueue(
            "delete_document",
            Method::Delete,
            format!("indexes/{}/documents/{}", index, id),
            None,
        )
        .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_documents<I: Serialize + Sync>(
        &self,
        index: &str,
        ids: &[I],
    ) -> Result<Task, ConnectorError> {
        self.enqueue(
            "delete_documents",
            Method::Post,
            format!("indexes/{}/documents/delete-batch", index),
            Some(serde_json::to_value(ids)?),
        )
        .await
    }

    /// Delete every document matching the query's where-clauses.
    ///
    /// Search text, ordering and facets are ignored.
    #[instrument(skip(self, query), fields(index = %query.index()))]
    pub async fn delete_by_query(&self, query: &Query) -> Result<Task, ConnectorError> {
        let filter = query.compile_filters_with(&self.translator)?;
        debug!(?filter, "Deleting by filter");
        self.enqueue(
            "delete_by_query",
            Method::Post,
            format!("indexes/{}/documents/delete", query.index()),
            Some(json!({ "filter": filter })),
        )
        .await
    }
}
