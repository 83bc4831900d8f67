//! Index lifecycle for Connector

use serde_json::json;
use tracing::{info, instrument};

use crate::error::ConnectorError;
use crate::tasks::{PollConfig, Task};
use crate::transport::{ApiRequest, Method};

use super::types::{IndexInfo, IndexPage};
use super::Connector;

/// Page size used when walking `GET indexes`.
const INDEX_PAGE_SIZE: usize = 100;

impl Connector {
    // ═══════════════════════════════════════════════════════════════════════════
    // Index API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Every index, following pagination to the end.
    pub async fn list_indexes(&self) -> Result<Vec<IndexInfo>, ConnectorError> {
        let mut indexes = Vec::new();
        let mut offset = 0;
        loop {
            let page: IndexPage = self
                .send(
                    "list_indexes",
                    ApiRequest::get("indexes")
                        .with_query("offset", offset.to_string())
                        .with_query("limit", INDEX_PAGE_SIZE.to_string()),
                )
                .await?
                .decode()?;
            let fetched = page.results.len();
            indexes.extend(page.results);
            offset = page.offset + fetched;
            if fetched == 0 || offset >= page.total || page.limit == 0 {
                break;
            }
        }
        Ok(indexes)
    }

    pub async fn get_index(&self, index: &str) -> Result<IndexInfo, ConnectorError> {
        self.get_json("get_index", format!("indexes/{}", index)).await
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool, ConnectorError> {
        match self.get_index(index).await {
            Ok(_) => Ok(true),
            Err(ConnectorError::IndexNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_index(&self, index: &str, primary_key: &str) -> Result<Task, ConnectorError> {
        let task = self
            .enqueue(
                "create_index",
                Method::Post,
                "indexes".to_string(),
                Some(json!({ "uid": index, "primaryKey": primary_key })),
            )
            .await?;
        info!(uid = task.uid, "Index creation enqueued");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn delete_index(&self, index: &str) -> Result<Task, ConnectorError> {
        self.enqueue("delete_index", Method::Delete, format!("indexes/{}", index), None)
            .await
    }

    /// Atomically swap the contents of two indexes.
    #[instrument(skip(self))]
    pub async fn swap_indexes(&self, first: &str, second: &str) -> Result<Task, ConnectorError> {
        self.enqueue(
            "swap_indexes",
            Method::Post,
            "swap-indexes".to_string(),
            Some(json!([{ "indexes": [first, second] }])),
        )
        .await
    }

    /// Create `target` with the primary key and settings of `source`.
    ///
    /// Documents are not copied. Waits for every task with `poll` and returns
    /// them in the order they were enqueued.
    #[instrument(skip(self, poll))]
    pub async fn copy_index(
        &self,
        source: &str,
        target: &str,
        poll: &PollConfig,
    ) -> Result<Vec<Task>, ConnectorError> {
        let info = self.get_index(source).await?;
        let primary_key = info.primary_key.unwrap_or_else(|| "id".to_string());

        let filterable = self.get_filterable_attributes(source).await?;
        let searchable = self.get_searchable_attributes(source).await?;
        let sortable = self.get_sortable_attributes(source).await?;
        let ranking = self.get_ranking_rules(source).await?;
        let max_total_hits = self.get_max_total_hits(source).await?;
        let max_values_per_facet = self.get_max_values_per_facet(source).await?;

        let mut tasks = Vec::with_capacity(7);
        let created = self.create_index(target, &primary_key).await?;
        tasks.push(self.wait_for_task_with(created, poll).await?);

        let enqueued = [
            self.update_filterable_attributes(target, &filterable).await?,
            self.update_searchable_attributes(target, &searchable).await?,
            self.update_sortable_attributes(target, &sortable).await?,
            self.update_ranking_rules(target, &ranking).await?,
            self.set_max_total_hits(target, max_total_hits).await?,
            self.set_max_values_per_facet(target, max_values_per_facet).await?,
        ];
        for task in enqueued {
            tasks.push(self.wait_for_task_with(task, poll).await?);
        }

        info!(tasks = tasks.len(), "Index copied");
        Ok(tasks)
    }
}
