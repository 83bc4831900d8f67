// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Task polling with backoff, deadline, attempt cap and cancellation.
//!
//! # Example
//!
//! ```rust,no_run
//! use meili_connector::tasks::{PollConfig, TaskPoller};
//! use meili_connector::{Connector, ConnectorConfig};
//! use tokio::sync::watch;
//!
//! # async fn example(connector: &Connector) -> Result<(), meili_connector::ConnectorError> {
//! let task = connector.create_index("products", "id").await?;
//!
//! let (_stop, stop_rx) = watch::channel(false);
//! let poller = TaskPoller::new(PollConfig::default()).with_cancellation(stop_rx);
//! let outcome = poller.poll(connector.transport(), task).await?;
//! let task = outcome.into_result()?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::Task;
use crate::error::ConnectorError;
use crate::metrics;
use crate::resilience::retry::grow_delay;
use crate::transport::Transport;

/// Polling cadence and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay after the first status check
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Delay multiplier between checks (1.0 = fixed cadence)
    pub backoff_factor: f64,
    /// Give up once this much time has passed since polling began
    pub max_wait: Duration,
    /// Give up after this many status checks
    pub max_attempts: Option<usize>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_wait: Duration::from_secs(300),
            max_attempts: None,
        }
    }
}

impl PollConfig {
    /// Constant cadence, bounded by the default deadline.
    #[must_use]
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            backoff_factor: 1.0,
            ..Self::default()
        }
    }

    /// Fast polling for tests (minimal delays)
    #[must_use]
    pub fn test() -> Self {
        Self {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(5),
            backoff_factor: 2.0,
            max_wait: Duration::from_secs(5),
            max_attempts: Some(50),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Delay after status check number `check` (1-based).
    pub fn delay_after(&self, check: usize) -> Duration {
        let mut delay = self.initial_interval.min(self.max_interval);
        for _ in 1..check {
            delay = grow_delay(delay, self.backoff_factor, self.max_interval);
        }
        delay
    }
}

/// How a poll ended. Each variant carries the last task snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Succeeded(Task),
    Failed(Task),
    /// Canceled on the engine side
    Canceled(Task),
    /// Deadline or attempt cap reached before a terminal status
    TimedOut {
        task: Task,
        waited: Duration,
        checks: usize,
    },
    /// Polling stopped by the caller
    Cancelled(Task),
}

impl TaskOutcome {
    pub fn task(&self) -> &Task {
        match self {
            Self::Succeeded(task)
            | Self::Failed(task)
            | Self::Canceled(task)
            | Self::Cancelled(task) => task,
            Self::TimedOut { task, .. } => task,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::Canceled(_) => "canceled",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled(_) => "cancelled",
        }
    }

    /// The succeeded task, or the typed error for any other outcome.
    ///
    /// A failed task's error code picks the variant: known codes map to
    /// their dedicated errors, anything else to [`ConnectorError::TaskFailed`].
    pub fn into_result(self) -> Result<Task, ConnectorError> {
        match self {
            Self::Succeeded(task) => Ok(task),
            Self::Failed(task) => {
                let (code, message) = task
                    .error
                    .map(|e| (e.code, e.message))
                    .unwrap_or_else(|| ("unknown".to_string(), String::new()));
                Err(ConnectorError::from_known_code(&code, &message).unwrap_or(
                    ConnectorError::TaskFailed {
                        uid: task.uid,
                        code,
                        message,
                    },
                ))
            }
            Self::Canceled(task) => Err(ConnectorError::TaskCanceled { uid: task.uid }),
            Self::TimedOut {
                task,
                waited,
                checks,
            } => Err(ConnectorError::TaskTimedOut {
                uid: task.uid,
                waited,
                checks,
            }),
            Self::Cancelled(task) => Err(ConnectorError::PollCancelled { uid: task.uid }),
        }
    }
}

/// Follows a task to a terminal status.
#[derive(Debug, Clone, Default)]
pub struct TaskPoller {
    config: PollConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl TaskPoller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stop polling once the channel carries `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `GET tasks/{uid}` until the task is terminal, the deadline or
    /// attempt cap is hit, or polling is cancelled.
    ///
    /// The deadline and the cancel signal also bound each status request.
    /// Transport failures and error responses abort polling with an error;
    /// every other ending is a [`TaskOutcome`].
    pub async fn poll(
        &self,
        transport: &dyn Transport,
        task: Task,
    ) -> Result<TaskOutcome, ConnectorError> {
        let started = Instant::now();
        let path = format!("tasks/{}", task.uid);
        let mut cancel = self.cancel.clone();
        let mut snapshot = task;
        let mut checks = 0usize;

        let outcome = loop {
            if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                break TaskOutcome::Cancelled(snapshot);
            }

            let remaining = self.config.max_wait.saturating_sub(started.elapsed());
            let fetch = timeout(remaining, transport.get(&path));
            let fetched = match cancel.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        fetched = fetch => fetched,
                        _ = cancelled(rx) => break TaskOutcome::Cancelled(snapshot),
                    }
                }
                None => fetch.await,
            };
            let Ok(response) = fetched else {
                let waited = started.elapsed();
                warn!(uid = snapshot.uid, ?waited, checks, "Task status request outlived the deadline");
                break TaskOutcome::TimedOut {
                    task: snapshot,
                    waited,
                    checks,
                };
            };
            let response = response?;
            if !response.is_success() {
                return Err(ConnectorError::from_response(&response));
            }
            snapshot = response.decode()?;
            checks += 1;
            debug!(uid = snapshot.uid, status = %snapshot.status, checks, "Task status checked");

            if snapshot.is_terminal() {
                break match snapshot.status {
                    super::TaskStatus::Succeeded => TaskOutcome::Succeeded(snapshot),
                    super::TaskStatus::Failed => TaskOutcome::Failed(snapshot),
                    _ => TaskOutcome::Canceled(snapshot),
                };
            }

            let waited = started.elapsed();
            let out_of_attempts = self.config.max_attempts.is_some_and(|max| checks >= max);
            if out_of_attempts || waited >= self.config.max_wait {
                warn!(uid = snapshot.uid, ?waited, checks, "Task did not finish in time");
                break TaskOutcome::TimedOut {
                    task: snapshot,
                    waited,
                    checks,
                };
            }

            let delay = self
                .config
                .delay_after(checks)
                .min(self.config.max_wait - waited);
            match cancel.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancelled(rx) => break TaskOutcome::Cancelled(snapshot),
                    }
                }
                None => sleep(delay).await,
            }
        };

        info!(
            uid = outcome.task().uid,
            outcome = outcome.label(),
            checks,
            "Task polling finished"
        );
        metrics::record_task_poll(outcome.label(), checks);
        Ok(outcome)
    }
}

/// Resolves once the flag is `true`. A dropped sender never cancels.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskStatus;
    use crate::transport::{ApiRequest, ApiResponse, ScriptedTransport};
    use async_trait::async_trait;
    use serde_json::json;

    fn summary(uid: u64) -> Task {
        serde_json::from_value(json!({
            "taskUid": uid,
            "indexUid": "products",
            "status": "enqueued",
            "type": "indexCreation"
        }))
        .unwrap()
    }

    fn task_json(uid: u64, status: &str) -> serde_json::Value {
        json!({"uid": uid, "indexUid": "products", "status": status, "type": "indexCreation"})
    }

    #[tokio::test]
    async fn test_succeeds_after_three_checks() {
        let transport = ScriptedTransport::new();
        transport
            .respond_ok(task_json(7, "enqueued"))
            .respond_ok(task_json(7, "processing"))
            .respond_ok(task_json(7, "succeeded"));

        let outcome = TaskPoller::new(PollConfig::test())
            .poll(&transport, summary(7))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.task().status, TaskStatus::Succeeded);
        assert_eq!(transport.request_count(), 3);
        assert!(transport.requests().iter().all(|r| r.path == "tasks/7"));
    }

    #[tokio::test]
    async fn test_failed_task_maps_known_code() {
        let transport = ScriptedTransport::new();
        transport.respond_ok(json!({
            "uid": 9,
            "status": "failed",
            "type": "documentAdditionOrUpdate",
            "error": {"code": "index_not_found", "message": "Index `products` not found."}
        }));

        let outcome = TaskPoller::new(PollConfig::test())
            .poll(&transport, summary(9))
            .await
            .unwrap();

        assert!(matches!(outcome, TaskOutcome::Failed(_)));
        assert!(matches!(
            outcome.into_result(),
            Err(ConnectorError::IndexNotFound(m)) if m == "Index `products` not found."
        ));
    }

    #[tokio::test]
    async fn test_failed_task_with_unknown_code() {
        let transport = ScriptedTransport::new();
        transport.respond_ok(json!({
            "uid": 3,
            "status": "failed",
            "type": "settingsUpdate",
            "error": {"code": "invalid_settings_ranking_rules", "message": "bad rule"}
        }));

        let result = TaskPoller::new(PollConfig::test())
            .poll(&transport, summary(3))
            .await
            .unwrap()
            .into_result();

        assert!(matches!(
            result,
            Err(ConnectorError::TaskFailed { uid: 3, code, message })
                if code == "invalid_settings_ranking_rules" && message == "bad rule"
        ));
    }

    #[tokio::test]
    async fn test_engine_side_cancel() {
        let transport = ScriptedTransport::new();
        transport.respond_ok(task_json(5, "canceled"));

        let outcome = TaskPoller::new(PollConfig::test())
            .poll(&transport, summary(5))
            .await
            .unwrap();

        assert!(matches!(outcome, TaskOutcome::Canceled(_)));
        assert!(matches!(
            outcome.into_result(),
            Err(ConnectorError::TaskCanceled { uid: 5 })
        ));
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let transport = ScriptedTransport::new();
        for _ in 0..3 {
            transport.respond_ok(task_json(1, "processing"));
        }

        let outcome = TaskPoller::new(PollConfig::test().with_max_attempts(3))
            .poll(&transport, summary(1))
            .await
            .unwrap();

        assert!(matches!(outcome, TaskOutcome::TimedOut { checks: 3, .. }));
        assert!(matches!(
            outcome.into_result(),
            Err(ConnectorError::TaskTimedOut { uid: 1, checks: 3, .. })
        ));
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let transport = ScriptedTransport::new();
        for _ in 0..20 {
            transport.respond_ok(task_json(1, "enqueued"));
        }
        let config = PollConfig::fixed(Duration::from_secs(1)).with_max_wait(Duration::from_secs(3));

        let outcome = TaskPoller::new(config)
            .poll(&transport, summary(1))
            .await
            .unwrap();

        match outcome {
            TaskOutcome::TimedOut { waited, checks, .. } => {
                assert!(waited >= Duration::from_secs(3));
                assert_eq!(checks, 4);
            }
            other => panic!("Expected TimedOut, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_before_first_check() {
        let transport = ScriptedTransport::new();
        let (_tx, rx) = watch::channel(true);

        let outcome = TaskPoller::new(PollConfig::test())
            .with_cancellation(rx)
            .poll(&transport, summary(2))
            .await
            .unwrap();

        assert!(matches!(outcome, TaskOutcome::Cancelled(_)));
        assert_eq!(transport.request_count(), 0);
        assert!(matches!(
            outcome.into_result(),
            Err(ConnectorError::PollCancelled { uid: 2 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_wait() {
        let transport = ScriptedTransport::new();
        transport.respond_ok(task_json(2, "processing"));
        let (tx, rx) = watch::channel(false);

        let poller = TaskPoller::new(PollConfig::fixed(Duration::from_secs(60))).with_cancellation(rx);
        let handle = tokio::spawn(async move { poller.poll(&transport, summary(2)).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, TaskOutcome::Cancelled(t) if t.status == TaskStatus::Processing));
    }

    /// Answers every status request after `delay`.
    struct SlowTransport {
        delay: Duration,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, ConnectorError> {
            sleep(self.delay).await;
            Ok(ApiResponse::ok(task_json(4, "processing")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_status_request_respects_deadline() {
        let transport = SlowTransport {
            delay: Duration::from_secs(30),
        };
        let config = PollConfig::fixed(Duration::from_millis(100)).with_max_wait(Duration::from_secs(1));

        let started = Instant::now();
        let outcome = TaskPoller::new(config).poll(&transport, summary(4)).await.unwrap();

        match outcome {
            TaskOutcome::TimedOut { task, checks, .. } => {
                assert_eq!(checks, 0);
                assert_eq!(task.status, TaskStatus::Enqueued);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_status_request() {
        let (tx, rx) = watch::channel(false);
        let poller = TaskPoller::new(PollConfig::default()).with_cancellation(rx);

        let started = Instant::now();
        let handle = tokio::spawn(async move {
            let transport = SlowTransport {
                delay: Duration::from_secs(30),
            };
            poller.poll(&transport, summary(4)).await
        });

        sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, TaskOutcome::Cancelled(_)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_unusable_backoff_factor_does_not_panic() {
        for factor in [-1.0, 0.0, f64::NAN, f64::INFINITY, f64::MAX] {
            let config = PollConfig {
                backoff_factor: factor,
                ..PollConfig::default()
            };
            assert!(config.delay_after(2) <= config.max_interval);
            assert!(config.delay_after(50) <= config.max_interval);
        }
    }

    #[tokio::test]
    async fn test_error_response_aborts() {
        let transport = ScriptedTransport::new();
        transport.respond(
            404,
            json!({"code": "task_not_found", "message": "Task `8` not found."}),
        );

        let result = TaskPoller::new(PollConfig::test())
            .poll(&transport, summary(8))
            .await;

        assert!(matches!(
            result,
            Err(ConnectorError::Api { status: 404, code, .. }) if code == "task_not_found"
        ));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = PollConfig {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_wait: Duration::from_secs(10),
            max_attempts: None,
        };

        assert_eq!(config.delay_after(1), Duration::from_millis(100));
        assert_eq!(config.delay_after(2), Duration::from_millis(200));
        assert_eq!(config.delay_after(3), Duration::from_millis(400));
        assert_eq!(config.delay_after(4), Duration::from_millis(500));
        assert_eq!(config.delay_after(10), Duration::from_millis(500));
    }

    #[test]
    fn test_fixed_cadence() {
        let config = PollConfig::fixed(Duration::from_secs(1));
        assert_eq!(config.delay_after(1), Duration::from_secs(1));
        assert_eq!(config.delay_after(5), Duration::from_secs(1));
    }
}
