//! Process-wide observability set up once at startup.
//!
//! Logging goes through `tracing`; the subscriber is installed by
//! [`init_tracing`]. Counters are grouped in [`TodoMetrics`], which is built
//! once and handed to the orchestrator and the worker explicitly.

mod counters;
mod logging;

pub use counters::{TodoMetrics, install_prometheus_exporter};
pub use logging::init_tracing;

use thiserror::Error;

/// Errors raised while installing observability backends.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),

    /// The metrics exporter could not be installed.
    #[error("failed to install metrics exporter: {0}")]
    Exporter(String),
}
