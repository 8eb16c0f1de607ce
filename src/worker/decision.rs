//! Mapping from processing results to broker acknowledgements.

use super::ProcessingError;
use crate::todo::domain::CompletionOutcome;
use std::fmt;

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryDecision {
    /// Positive acknowledgement; the message is removed.
    Ack,
    /// Negative acknowledgement with requeue; the message is redelivered.
    Requeue,
    /// Negative acknowledgement without requeue; the message is dropped or
    /// dead-lettered by the broker.
    Reject,
}

impl DeliveryDecision {
    /// Decides how to settle a delivery.
    ///
    /// `delivery_count` is the number of prior deliveries reported by the
    /// broker. A requeue becomes a reject once it reaches
    /// `max_redeliveries`; without a count or a budget requeues are
    /// unbounded.
    #[must_use]
    pub fn for_result(
        result: &Result<CompletionOutcome, ProcessingError>,
        delivery_count: Option<u32>,
        max_redeliveries: Option<u32>,
    ) -> Self {
        match result {
            Ok(_) => Self::Ack,
            Err(err) if err.is_permanent() => Self::Reject,
            Err(_) if budget_exhausted(delivery_count, max_redeliveries) => Self::Reject,
            Err(_) => Self::Requeue,
        }
    }

    /// Returns the lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ack => "ack",
            Self::Requeue => "requeue",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for DeliveryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn budget_exhausted(delivery_count: Option<u32>, max_redeliveries: Option<u32>) -> bool {
    match (delivery_count, max_redeliveries) {
        (Some(count), Some(max)) => count >= max,
        _ => false,
    }
}
