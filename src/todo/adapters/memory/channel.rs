//! In-memory event channel with exchange routing and manual acknowledgement.
//!
//! Queues are bound to `(exchange, routing_key)` pairs. Publishing routes a
//! copy of the body to every bound queue; unroutable messages are recorded but
//! otherwise dropped. Consumers take messages from a queue and must settle
//! each one: an ack removes it, a nack with requeue puts it back at the tail
//! with its delivery count raised, and a nack without requeue moves it to the
//! dead letters. A delivery dropped without being settled is requeued.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::todo::ports::{
    Delivery, DeliveryAcker, EventChannelError, EventChannelResult, EventPublisher,
    EventSubscription,
};

/// A message accepted by [`InMemoryEventChannel::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// Message body.
    pub body: Vec<u8>,
}

/// Thread-safe in-memory broker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventChannel {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<ChannelState>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct ChannelState {
    bindings: HashMap<(String, String), Vec<String>>,
    queues: HashMap<String, QueueState>,
    published: Vec<PublishedMessage>,
    reject_publishes: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<QueuedMessage>,
    unacked: usize,
    acked: usize,
    dead_letters: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct QueuedMessage {
    body: Vec<u8>,
    delivery_count: u32,
}

impl Shared {
    fn lock(&self) -> EventChannelResult<MutexGuard<'_, ChannelState>> {
        self.state
            .lock()
            .map_err(|err| EventChannelError::transport(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryEventChannel {
    /// Creates a broker with no queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `queue` and binds it to `exchange` with `routing_key`.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn bind(&self, exchange: &str, routing_key: &str, queue: &str) -> EventChannelResult<()> {
        let mut state = self.shared.lock()?;
        state.queues.entry(queue.to_owned()).or_default();
        let bound = state
            .bindings
            .entry((exchange.to_owned(), routing_key.to_owned()))
            .or_default();
        if !bound.iter().any(|existing| existing == queue) {
            bound.push(queue.to_owned());
        }
        Ok(())
    }

    /// Makes subsequent publishes fail as if the broker refused them.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn set_reject_publishes(&self, reject: bool) -> EventChannelResult<()> {
        self.shared.lock()?.reject_publishes = reject;
        Ok(())
    }

    /// Returns every accepted message in publish order.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn published(&self) -> EventChannelResult<Vec<PublishedMessage>> {
        Ok(self.shared.lock()?.published.clone())
    }

    /// Returns the number of messages waiting in `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn ready_count(&self, queue: &str) -> EventChannelResult<usize> {
        let state = self.shared.lock()?;
        Ok(state.queues.get(queue).map_or(0, |q| q.ready.len()))
    }

    /// Returns the number of acknowledged messages in `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn acked_count(&self, queue: &str) -> EventChannelResult<usize> {
        let state = self.shared.lock()?;
        Ok(state.queues.get(queue).map_or(0, |q| q.acked))
    }

    /// Returns bodies rejected from `queue` without requeue.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when lock acquisition fails.
    pub fn dead_letters(&self, queue: &str) -> EventChannelResult<Vec<Vec<u8>>> {
        let state = self.shared.lock()?;
        Ok(state
            .queues
            .get(queue)
            .map(|q| q.dead_letters.clone())
            .unwrap_or_default())
    }

    /// Subscribes to `queue`, waiting indefinitely for messages.
    #[must_use]
    pub fn subscribe(&self, queue: &str) -> InMemorySubscription {
        InMemorySubscription::new(Arc::clone(&self.shared), queue, false)
    }

    /// Subscribes to `queue`, ending once it is empty and every delivery has
    /// been settled.
    #[must_use]
    pub fn subscribe_until_idle(&self, queue: &str) -> InMemorySubscription {
        InMemorySubscription::new(Arc::clone(&self.shared), queue, true)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventChannel {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> EventChannelResult<()> {
        {
            let mut state = self.shared.lock()?;
            if state.reject_publishes {
                return Err(EventChannelError::Rejected {
                    exchange: exchange.to_owned(),
                    routing_key: routing_key.to_owned(),
                });
            }

            state.published.push(PublishedMessage {
                exchange: exchange.to_owned(),
                routing_key: routing_key.to_owned(),
                body: body.to_vec(),
            });

            let targets = state
                .bindings
                .get(&(exchange.to_owned(), routing_key.to_owned()))
                .cloned()
                .unwrap_or_default();
            for queue in targets {
                state
                    .queues
                    .entry(queue)
                    .or_default()
                    .ready
                    .push_back(QueuedMessage {
                        body: body.to_vec(),
                        delivery_count: 0,
                    });
            }
        }
        self.shared.notify.notify_waiters();
        Ok(())
    }
}

/// Consumer bound to one queue of an [`InMemoryEventChannel`].
#[derive(Debug)]
pub struct InMemorySubscription {
    shared: Arc<Shared>,
    queue: String,
    until_idle: bool,
    closed: bool,
}

enum Poll {
    Ready(Delivery),
    Idle,
    Wait,
}

impl InMemorySubscription {
    fn new(shared: Arc<Shared>, queue: &str, until_idle: bool) -> Self {
        Self {
            shared,
            queue: queue.to_owned(),
            until_idle,
            closed: false,
        }
    }

    fn poll_queue(&self) -> EventChannelResult<Poll> {
        let mut state = self.shared.lock()?;
        let queue = state.queues.entry(self.queue.clone()).or_default();

        if let Some(message) = queue.ready.pop_front() {
            queue.unacked += 1;
            let acker = InMemoryAcker {
                shared: Arc::clone(&self.shared),
                queue: self.queue.clone(),
                message: message.clone(),
                settled: AtomicBool::new(false),
            };
            let delivery = Delivery::new(message.body, Box::new(acker))
                .with_redelivered(message.delivery_count > 0)
                .with_delivery_count(message.delivery_count);
            return Ok(Poll::Ready(delivery));
        }

        if self.until_idle && queue.unacked == 0 {
            return Ok(Poll::Idle);
        }
        Ok(Poll::Wait)
    }
}

#[async_trait]
impl EventSubscription for InMemorySubscription {
    async fn next_delivery(&mut self) -> Option<EventChannelResult<Delivery>> {
        loop {
            if self.closed {
                return None;
            }

            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.poll_queue() {
                Ok(Poll::Ready(delivery)) => return Some(Ok(delivery)),
                Ok(Poll::Idle) => return None,
                Ok(Poll::Wait) => notified.await,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    async fn close(&mut self) -> EventChannelResult<()> {
        self.closed = true;
        Ok(())
    }
}

struct InMemoryAcker {
    shared: Arc<Shared>,
    queue: String,
    message: QueuedMessage,
    settled: AtomicBool,
}

impl InMemoryAcker {
    fn settle(
        &self,
        apply: impl FnOnce(&mut QueueState, &QueuedMessage),
    ) -> EventChannelResult<()> {
        if self.settled.swap(true, Ordering::SeqCst) {
            return Err(EventChannelError::Closed);
        }
        {
            let mut state = self.shared.lock()?;
            let queue = state.queues.entry(self.queue.clone()).or_default();
            queue.unacked = queue.unacked.saturating_sub(1);
            apply(queue, &self.message);
        }
        self.shared.notify.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl DeliveryAcker for InMemoryAcker {
    async fn ack(&self) -> EventChannelResult<()> {
        self.settle(|queue, _| queue.acked += 1)
    }

    async fn nack(&self, requeue: bool) -> EventChannelResult<()> {
        self.settle(|queue, message| {
            if requeue {
                requeue_message(queue, message);
            } else {
                queue.dead_letters.push(message.body.clone());
            }
        })
    }
}

impl Drop for InMemoryAcker {
    fn drop(&mut self) {
        if !self.settled.load(Ordering::SeqCst) {
            drop(self.settle(requeue_message));
        }
    }
}

fn requeue_message(queue: &mut QueueState, message: &QueuedMessage) {
    queue.ready.push_back(QueuedMessage {
        body: message.body.clone(),
        delivery_count: message.delivery_count + 1,
    });
}
