//! Event channel ports: fire-and-forget publishing and a competing-consumer
//! subscription with manual acknowledgement.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event channel operations.
pub type EventChannelResult<T> = Result<T, EventChannelError>;

/// Publishing side of the event channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `body` to `exchange` with `routing_key`.
    ///
    /// Returns once the broker has accepted the message.
    async fn publish(&self, exchange: &str, routing_key: &str, body: &[u8])
    -> EventChannelResult<()>;
}

/// Acknowledgement handle attached to a single delivery.
#[async_trait]
pub trait DeliveryAcker: Send + Sync {
    /// Confirms processing; the broker drops the message.
    async fn ack(&self) -> EventChannelResult<()>;

    /// Reports failure. With `requeue` the broker redelivers the message;
    /// without it the message is discarded or dead-lettered.
    async fn nack(&self, requeue: bool) -> EventChannelResult<()>;
}

/// A message handed to a consumer, awaiting acknowledgement.
pub struct Delivery {
    body: Vec<u8>,
    redelivered: bool,
    delivery_count: Option<u32>,
    acker: Box<dyn DeliveryAcker>,
}

impl Delivery {
    /// Creates a delivery from its body and acknowledgement handle.
    #[must_use]
    pub fn new(body: Vec<u8>, acker: Box<dyn DeliveryAcker>) -> Self {
        Self {
            body,
            redelivered: false,
            delivery_count: None,
            acker,
        }
    }

    /// Marks the delivery as a redelivery.
    #[must_use]
    pub const fn with_redelivered(mut self, redelivered: bool) -> Self {
        self.redelivered = redelivered;
        self
    }

    /// Records how many times the broker has delivered this message before.
    #[must_use]
    pub const fn with_delivery_count(mut self, delivery_count: u32) -> Self {
        self.delivery_count = Some(delivery_count);
        self
    }

    /// Returns the message body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns `true` if the broker delivered this message before.
    #[must_use]
    pub const fn redelivered(&self) -> bool {
        self.redelivered
    }

    /// Returns the number of prior deliveries when the broker reports it.
    #[must_use]
    pub const fn delivery_count(&self) -> Option<u32> {
        self.delivery_count
    }

    /// Acknowledges the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError`] when the channel rejects the ack.
    pub async fn ack(&self) -> EventChannelResult<()> {
        self.acker.ack().await
    }

    /// Negatively acknowledges the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError`] when the channel rejects the nack.
    pub async fn nack(&self, requeue: bool) -> EventChannelResult<()> {
        self.acker.nack(requeue).await
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("body_len", &self.body.len())
            .field("redelivered", &self.redelivered)
            .field("delivery_count", &self.delivery_count)
            .finish_non_exhaustive()
    }
}

/// Consuming side of the event channel bound to one queue.
///
/// The subscription owns its broker channel until [`Self::close`] is called.
#[async_trait]
pub trait EventSubscription: Send {
    /// Waits for the next delivery.
    ///
    /// Returns `None` once the subscription has ended. Dropping the returned
    /// future before it completes must not lose a message.
    async fn next_delivery(&mut self) -> Option<EventChannelResult<Delivery>>;

    /// Releases the underlying broker channel.
    async fn close(&mut self) -> EventChannelResult<()>;
}

/// Errors returned by event channel adapters.
#[derive(Debug, Clone, Error)]
pub enum EventChannelError {
    /// The broker refused to accept a published message.
    #[error("broker rejected message for exchange '{exchange}' routing key '{routing_key}'")]
    Rejected {
        /// Target exchange.
        exchange: String,
        /// Routing key used.
        routing_key: String,
    },

    /// The subscription or channel is closed.
    #[error("event channel closed")]
    Closed,

    /// Transport or protocol failure.
    #[error("event channel transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventChannelError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
