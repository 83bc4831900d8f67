//! Health, version, stats and tasks for Connector

use serde_json::Value;
use tracing::instrument;

use crate::error::ConnectorError;
use crate::tasks::{PollConfig, Task, TaskList, TaskOutcome, TaskPoller};
use crate::transport::ApiRequest;

use super::types::{Health, TaskFilter, Version};
use super::Connector;

impl Connector {
    // ═══════════════════════════════════════════════════════════════════════════
    // System API
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn health(&self) -> Result<Health, ConnectorError> {
        self.get_json("health", "health".to_string()).await
    }

    pub async fn version(&self) -> Result<Version, ConnectorError> {
        self.get_json("version", "version".to_string()).await
    }

    /// Instance-wide stats, or one index's stats when `index` is given.
    pub async fn stats(&self, index: Option<&str>) -> Result<Value, ConnectorError> {
        let path = match index {
            Some(index) => format!("indexes/{}/stats", index),
            None => "stats".to_string(),
        };
        self.get_json("stats", path).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Tasks
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<TaskList, ConnectorError> {
        let mut request = ApiRequest::get("tasks");
        request.query = filter.to_query();
        self.send("list_tasks", request).await?.decode()
    }

    pub async fn get_task(&self, uid: u64) -> Result<Task, ConnectorError> {
        self.get_json("get_task", format!("tasks/{}", uid)).await
    }

    /// Follow `task` with `poller` and report how polling ended.
    pub async fn poll_task(&self, task: Task, poller: &TaskPoller) -> Result<TaskOutcome, ConnectorError> {
        poller.poll(self.transport(), task).await
    }

    /// Wait for `task` with the configured cadence; anything but success is
    /// an error.
    pub async fn wait_for_task(&self, task: Task) -> Result<Task, ConnectorError> {
        self.poll_task(task, &self.poller()).await?.into_result()
    }

    #[instrument(skip(self, task, config), fields(uid = task.uid))]
    pub async fn wait_for_task_with(&self, task: Task, config: &PollConfig) -> Result<Task, ConnectorError> {
        TaskPoller::new(config.clone())
            .poll(self.transport(), task)
            .await?
            .into_result()
    }
}
