//! Per-delivery processing for the completion worker.

use super::{DeliveryDecision, WorkerSettings};
use crate::telemetry::TodoMetrics;
use crate::todo::{
    domain::{CompletionEvent, CompletionOutcome},
    ports::Delivery,
    services::{CompletionApplier, TodoServiceError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a delivery could not be applied.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The body is not a valid completion event.
    #[error("undecodable completion event: {0}")]
    Decode(#[source] serde_json::Error),

    /// The event discriminator is not handled by this worker.
    #[error("unsupported event '{0}'")]
    UnknownEvent(String),

    /// A `todo_completed` event arrived without a todo identifier.
    #[error("completion event has no todo_id")]
    MissingTodoId,

    /// The orchestrator failed to apply the completion.
    #[error("failed to apply completion: {0}")]
    Apply(#[source] TodoServiceError),
}

impl ProcessingError {
    /// Returns `true` when retrying the same body can never succeed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Consumer that turns completion events into applied completions.
pub struct CompletionWorker<A>
where
    A: CompletionApplier,
{
    applier: Arc<A>,
    settings: WorkerSettings,
    metrics: TodoMetrics,
}

impl<A> Clone for CompletionWorker<A>
where
    A: CompletionApplier,
{
    fn clone(&self) -> Self {
        Self {
            applier: Arc::clone(&self.applier),
            settings: self.settings,
            metrics: self.metrics.clone(),
        }
    }
}

impl<A> CompletionWorker<A>
where
    A: CompletionApplier,
{
    /// Creates a worker that records no metrics.
    #[must_use]
    pub fn new(applier: Arc<A>, settings: WorkerSettings) -> Self {
        Self {
            applier,
            settings,
            metrics: TodoMetrics::noop(),
        }
    }

    /// Records into the given metric handles.
    #[must_use]
    pub fn with_metrics(mut self, metrics: TodoMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the concurrency and retry policy.
    #[must_use]
    pub const fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Decodes a message body and applies the completion it requests.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::Decode`] for malformed bodies,
    /// [`ProcessingError::UnknownEvent`] for events other than
    /// `todo_completed`, [`ProcessingError::MissingTodoId`] when the
    /// identifier is absent, and [`ProcessingError::Apply`] when the
    /// applier fails.
    pub async fn process(&self, body: &[u8]) -> Result<CompletionOutcome, ProcessingError> {
        let event = CompletionEvent::from_json_slice(body).map_err(ProcessingError::Decode)?;
        if !event.is_todo_completed() {
            return Err(ProcessingError::UnknownEvent(event.event));
        }
        let todo_id = event.todo_id.ok_or(ProcessingError::MissingTodoId)?;

        self.applier
            .apply_completion(todo_id)
            .await
            .map_err(ProcessingError::Apply)
    }

    /// Processes a delivery and settles it with the broker.
    ///
    /// Settlement failures are logged; the broker redelivers unsettled
    /// messages once the channel closes.
    pub async fn handle_delivery(&self, delivery: Delivery) -> DeliveryDecision {
        let result = self.process(delivery.body()).await;
        let decision = DeliveryDecision::for_result(
            &result,
            delivery.delivery_count(),
            self.settings.max_redeliveries,
        );

        match &result {
            Ok(outcome) => debug!(?outcome, "completion event processed"),
            Err(err) => warn!(
                error = %err,
                outcome = %decision,
                redelivered = delivery.redelivered(),
                delivery_count = ?delivery.delivery_count(),
                "completion event failed"
            ),
        }

        let settled = match decision {
            DeliveryDecision::Ack => delivery.ack().await,
            DeliveryDecision::Requeue => delivery.nack(true).await,
            DeliveryDecision::Reject => delivery.nack(false).await,
        };
        if let Err(err) = settled {
            warn!(error = %err, outcome = %decision, "failed to settle delivery");
        }

        self.record(decision);
        decision
    }

    fn record(&self, decision: DeliveryDecision) {
        let counter = match decision {
            DeliveryDecision::Ack => &self.metrics.deliveries_acked,
            DeliveryDecision::Requeue => &self.metrics.deliveries_requeued,
            DeliveryDecision::Reject => &self.metrics.deliveries_rejected,
        };
        counter.increment(1);
    }
}
