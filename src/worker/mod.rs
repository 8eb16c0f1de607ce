//! Completion worker: consumes `todo_completed` events and applies them.
//!
//! Each delivery is decoded, dispatched to a [`CompletionApplier`], and
//! settled according to a [`DeliveryDecision`]:
//!
//! - applied or already completed todos are acknowledged;
//! - malformed bodies are rejected without requeue;
//! - every other failure is requeued for another attempt, unless a retry
//!   budget is configured and the broker reports it as spent.
//!
//! [`CompletionWorker::run`] drives a subscription with at most
//! [`WorkerSettings::prefetch`] deliveries in flight and stops on a
//! [`tokio_util::sync::CancellationToken`].
//!
//! [`CompletionApplier`]: crate::todo::services::CompletionApplier

mod decision;
mod processor;
mod runner;

pub use decision::DeliveryDecision;
pub use processor::{CompletionWorker, ProcessingError};
pub use runner::{WorkerError, WorkerSummary};

/// Default number of unacknowledged deliveries held at once.
pub const DEFAULT_PREFETCH: u16 = 10;

/// Concurrency and retry policy for [`CompletionWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Maximum deliveries processed concurrently.
    pub prefetch: u16,
    /// Prior deliveries after which a failing message is rejected rather
    /// than requeued. `None` requeues forever.
    pub max_redeliveries: Option<u32>,
}

impl WorkerSettings {
    /// Returns the settings with a retry budget.
    #[must_use]
    pub const fn with_max_redeliveries(mut self, max_redeliveries: u32) -> Self {
        self.max_redeliveries = Some(max_redeliveries);
        self
    }

    /// Returns the settings with a different prefetch bound.
    #[must_use]
    pub const fn with_prefetch(mut self, prefetch: u16) -> Self {
        self.prefetch = prefetch;
        self
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            prefetch: DEFAULT_PREFETCH,
            max_redeliveries: None,
        }
    }
}

#[cfg(test)]
mod tests;
