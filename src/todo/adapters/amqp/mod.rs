//! AMQP 0.9.1 (`RabbitMQ`) event channel adapters built on `lapin`.
//!
//! [`AmqpConnection`] owns the broker connection and declares the topology
//! (durable exchange, durable queue, binding). Publishing goes through
//! [`AmqpEventPublisher`] on a confirm-mode channel; consuming goes through an
//! [`AmqpSubscription`] on its own channel with a prefetch limit.

mod connection;
mod publisher;
mod subscription;

pub use connection::AmqpConnection;
pub use publisher::AmqpEventPublisher;
pub use subscription::AmqpSubscription;
