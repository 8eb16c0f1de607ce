//! Counters for cache, orchestration, and worker activity.

use super::TelemetryError;
use metrics::{Counter, counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::fmt;
use std::net::SocketAddr;

/// Counter handles for the todo lifecycle.
///
/// Built once at startup with [`TodoMetrics::register`] and cloned into the
/// components that record into it. [`TodoMetrics::noop`] discards everything.
#[derive(Clone)]
pub struct TodoMetrics {
    pub(crate) cache_hits: Counter,
    pub(crate) cache_misses: Counter,
    pub(crate) cache_errors: Counter,
    pub(crate) todos_created: Counter,
    pub(crate) completion_requests: Counter,
    pub(crate) completions_applied: Counter,
    pub(crate) completions_skipped: Counter,
    pub(crate) deliveries_acked: Counter,
    pub(crate) deliveries_requeued: Counter,
    pub(crate) deliveries_rejected: Counter,
}

impl TodoMetrics {
    /// Registers the counters with the installed `metrics` recorder.
    #[must_use]
    pub fn register() -> Self {
        describe_counter!("todo_cache_hits_total", "List reads served from cache");
        describe_counter!("todo_cache_misses_total", "List reads that fell through to storage");
        describe_counter!("todo_cache_errors_total", "Absorbed cache failures");
        describe_counter!("todo_created_total", "Todos created");
        describe_counter!("todo_completion_requests_total", "Completion events published");
        describe_counter!("todo_completions_applied_total", "Completions written to storage");
        describe_counter!(
            "todo_completions_skipped_total",
            "Completions for todos that were already completed"
        );
        describe_counter!("todo_worker_deliveries_total", "Worker acknowledgement decisions");

        Self {
            cache_hits: counter!("todo_cache_hits_total"),
            cache_misses: counter!("todo_cache_misses_total"),
            cache_errors: counter!("todo_cache_errors_total"),
            todos_created: counter!("todo_created_total"),
            completion_requests: counter!("todo_completion_requests_total"),
            completions_applied: counter!("todo_completions_applied_total"),
            completions_skipped: counter!("todo_completions_skipped_total"),
            deliveries_acked: counter!("todo_worker_deliveries_total", "outcome" => "ack"),
            deliveries_requeued: counter!("todo_worker_deliveries_total", "outcome" => "requeue"),
            deliveries_rejected: counter!("todo_worker_deliveries_total", "outcome" => "reject"),
        }
    }

    /// Returns handles that record nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            cache_hits: Counter::noop(),
            cache_misses: Counter::noop(),
            cache_errors: Counter::noop(),
            todos_created: Counter::noop(),
            completion_requests: Counter::noop(),
            completions_applied: Counter::noop(),
            completions_skipped: Counter::noop(),
            deliveries_acked: Counter::noop(),
            deliveries_requeued: Counter::noop(),
            deliveries_rejected: Counter::noop(),
        }
    }
}

impl fmt::Debug for TodoMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoMetrics").finish_non_exhaustive()
    }
}

impl Default for TodoMetrics {
    fn default() -> Self {
        Self::noop()
    }
}

/// Installs the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must run before [`TodoMetrics::register`] so the handles bind to it.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] when the listener cannot be bound or
/// a recorder is already installed.
pub fn install_prometheus_exporter(addr: SocketAddr) -> Result<(), TelemetryError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| TelemetryError::Exporter(err.to_string()))
}
