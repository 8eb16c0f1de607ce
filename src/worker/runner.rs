//! Consume loop with bounded concurrency and cooperative shutdown.

use super::{CompletionWorker, DeliveryDecision};
use crate::todo::{
    ports::{EventChannelError, EventSubscription},
    services::CompletionApplier,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Errors that end the consume loop.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The subscription stream broke.
    #[error("completion event subscription failed: {0}")]
    Channel(#[from] EventChannelError),
}

/// Settlement counts for one run of the consume loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Deliveries acknowledged.
    pub acked: u64,
    /// Deliveries requeued.
    pub requeued: u64,
    /// Deliveries rejected without requeue.
    pub rejected: u64,
}

impl WorkerSummary {
    /// Returns the number of settled deliveries.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.acked + self.requeued + self.rejected
    }

    const fn record(&mut self, decision: DeliveryDecision) {
        match decision {
            DeliveryDecision::Ack => self.acked += 1,
            DeliveryDecision::Requeue => self.requeued += 1,
            DeliveryDecision::Reject => self.rejected += 1,
        }
    }

    fn record_joined(&mut self, joined: Result<DeliveryDecision, JoinError>) {
        match joined {
            Ok(decision) => self.record(decision),
            Err(err) => error!(error = %err, "delivery task failed"),
        }
    }
}

impl<A> CompletionWorker<A>
where
    A: CompletionApplier + 'static,
{
    /// Consumes `subscription` until it ends or `shutdown` is cancelled.
    ///
    /// At most [`super::WorkerSettings::prefetch`] deliveries are processed
    /// at once. On shutdown no further deliveries are pulled, in-flight work
    /// is allowed to finish, and the subscription is closed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Channel`] when the subscription yields an
    /// error. In-flight deliveries are drained and the subscription closed
    /// first.
    pub async fn run<S>(
        &self,
        mut subscription: S,
        shutdown: CancellationToken,
    ) -> Result<WorkerSummary, WorkerError>
    where
        S: EventSubscription,
    {
        let prefetch = usize::from(self.settings().prefetch.max(1));
        let permits = Arc::new(Semaphore::new(prefetch));
        let mut in_flight = JoinSet::new();
        let mut summary = WorkerSummary::default();
        info!(prefetch, "completion worker started");

        let stopped = loop {
            while let Some(joined) = in_flight.try_join_next() {
                summary.record_joined(joined);
            }

            let permit = tokio::select! {
                biased;
                () = shutdown.cancelled() => break Ok(()),
                acquired = Arc::clone(&permits).acquire_owned() => match acquired {
                    Ok(permit) => permit,
                    Err(_) => break Ok(()),
                },
            };

            let delivery = tokio::select! {
                biased;
                () = shutdown.cancelled() => break Ok(()),
                next = subscription.next_delivery() => match next {
                    Some(Ok(delivery)) => delivery,
                    Some(Err(err)) => break Err(WorkerError::Channel(err)),
                    None => break Ok(()),
                },
            };

            let worker = self.clone();
            in_flight.spawn(async move {
                let decision = worker.handle_delivery(delivery).await;
                drop(permit);
                decision
            });
        };

        while let Some(joined) = in_flight.join_next().await {
            summary.record_joined(joined);
        }
        if let Err(err) = subscription.close().await {
            warn!(error = %err, "failed to close completion subscription");
        }

        info!(
            acked = summary.acked,
            requeued = summary.requeued,
            rejected = summary.rejected,
            "completion worker stopped"
        );
        stopped.map(|()| summary)
    }
}
