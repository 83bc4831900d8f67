// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for meili-connector.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `meili_connector_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: single, multi, split, random, facet
//! - `operation`: engine endpoint family (search, documents, settings, ...)
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a search dispatch
pub fn record_search(kind: &str, status: &str) {
    counter!(
        "meili_connector_search_requests_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record end-to-end search latency, all round trips included
pub fn record_search_latency(kind: &str, duration: Duration) {
    histogram!(
        "meili_connector_search_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record facet companion queries issued for a split search
pub fn record_companion_queries(count: usize) {
    counter!("meili_connector_companion_queries_total").increment(count as u64);
}

/// Record round trips spent on one random sample
pub fn record_random_round_trips(count: usize) {
    histogram!("meili_connector_random_sample_round_trips").record(count as f64);
}

/// Record a finished task poll
pub fn record_task_poll(outcome: &str, checks: usize) {
    counter!(
        "meili_connector_task_polls_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("meili_connector_task_poll_checks").record(checks as f64);
}

/// Record an error response from the engine
pub fn record_api_error(operation: &str, code: &str) {
    counter!(
        "meili_connector_api_errors_total",
        "operation" => operation.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

/// Record a retried read
pub fn record_retry(operation: &str) {
    counter!(
        "meili_connector_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// A timing guard that records search latency on drop
pub struct LatencyTimer {
    kind: &'static str,
    start: Instant,
}

impl LatencyTimer {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_search_latency(self.kind, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_search("single", "success");
        record_search_latency("split", Duration::from_millis(5));
        record_companion_queries(2);
        record_random_round_trips(6);
        record_task_poll("succeeded", 3);
        record_api_error("search", "invalid_search_filter");
        record_retry("get_task");
    }

    #[test]
    fn test_search_counter_recorded() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_search("split", "success");
            record_search("split", "success");
            record_companion_queries(3);
        });

        let mut snapshot = snapshotter.snapshot().into_vec();
        let mut counter_value = |name: &str| {
            snapshot
                .iter()
                .position(|(key, _, _, _)| key.key().name() == name)
                .map(|idx| snapshot.swap_remove(idx).3)
        };

        assert_eq!(
            counter_value("meili_connector_search_requests_total"),
            Some(DebugValue::Counter(2))
        );
        assert_eq!(
            counter_value("meili_connector_companion_queries_total"),
            Some(DebugValue::Counter(3))
        );
    }

    #[test]
    fn test_latency_timer() {
        {
            let _timer = LatencyTimer::new("single");
            std::thread::sleep(Duration::from_micros(10));
        }
    }
}
