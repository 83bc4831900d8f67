//! Asynchronous engine tasks.
//!
//! Every write (index creation, settings update, document write) is queued
//! by the engine and answered with a task summary. [`TaskPoller`] follows a
//! task to a terminal status.
//!
//! ```text
//! Enqueued ──→ Processing ──→ Succeeded
//!     │            ├────────→ Failed
//!     └────────────┴────────→ Canceled
//! ```

mod poller;

pub use poller::{PollConfig, TaskOutcome, TaskPoller};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    /// Status added by a newer engine version
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure reason attached to a failed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskError {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Task snapshot. Decodes both the summary returned by write endpoints
/// (`taskUid`) and the full object from `GET tasks/{uid}` (`uid`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "taskUid")]
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub enqueued_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// Page of `GET tasks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub results: Vec<Task>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub next: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}
