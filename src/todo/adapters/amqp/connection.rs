//! Broker connection and topology bootstrap.

use super::{AmqpEventPublisher, AmqpSubscription};
use crate::config::{QueueType, RabbitMqConfig};
use crate::todo::ports::{EventChannelError, EventChannelResult};
use lapin::{
    Channel, Connection, ConnectionProperties, ExchangeKind,
    options::{
        BasicConsumeOptions, BasicQosOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::{AMQPValue, FieldTable},
};
use std::sync::Arc;
use tracing::info;

/// Queue declaration argument selecting the queue implementation.
const QUEUE_TYPE_ARGUMENT: &str = "x-queue-type";

/// Connection to the broker with the completion topology declared.
#[derive(Clone)]
pub struct AmqpConnection {
    connection: Arc<Connection>,
    config: RabbitMqConfig,
}

impl AmqpConnection {
    /// Connects and declares the exchange, queue, and binding.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when the connection cannot be
    /// established or any declaration fails.
    pub async fn connect(config: RabbitMqConfig) -> EventChannelResult<Self> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(EventChannelError::transport)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(EventChannelError::transport)?;
        declare_topology(&channel, &config).await?;
        channel
            .close(200, "topology declared")
            .await
            .map_err(EventChannelError::transport)?;

        info!(
            exchange = %config.exchange_name,
            queue = %config.queue_name,
            queue_type = config.queue_type.map_or("default", QueueType::as_str),
            routing_key = %config.routing_key,
            "RabbitMQ connection established and queue configured"
        );
        Ok(Self {
            connection: Arc::new(connection),
            config,
        })
    }

    /// Returns the configuration the topology was declared from.
    #[must_use]
    pub const fn config(&self) -> &RabbitMqConfig {
        &self.config
    }

    /// Opens a confirm-mode publishing channel.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when the channel cannot be
    /// opened.
    pub async fn publisher(&self) -> EventChannelResult<AmqpEventPublisher> {
        AmqpEventPublisher::open(Arc::clone(&self.connection)).await
    }

    /// Starts consuming the configured queue on a dedicated channel.
    ///
    /// At most `prefetch_count` deliveries are outstanding at once.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when the channel cannot be
    /// opened, QoS cannot be applied, or the consumer is refused.
    pub async fn subscribe(&self) -> EventChannelResult<AmqpSubscription> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(EventChannelError::transport)?;
        channel
            .basic_qos(self.config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(EventChannelError::transport)?;
        let consumer = channel
            .basic_consume(
                &self.config.queue_name,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(EventChannelError::transport)?;
        Ok(AmqpSubscription::new(channel, consumer))
    }

    /// Closes the connection and every channel opened on it.
    ///
    /// # Errors
    ///
    /// Returns [`EventChannelError::Transport`] when the close handshake
    /// fails.
    pub async fn close(&self) -> EventChannelResult<()> {
        self.connection
            .close(200, "shutdown")
            .await
            .map_err(EventChannelError::transport)
    }
}

async fn declare_topology(channel: &Channel, config: &RabbitMqConfig) -> EventChannelResult<()> {
    channel
        .exchange_declare(
            &config.exchange_name,
            exchange_kind(&config.exchange_kind),
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(EventChannelError::transport)?;

    channel
        .queue_declare(
            &config.queue_name,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            queue_arguments(config.queue_type),
        )
        .await
        .map_err(EventChannelError::transport)?;

    channel
        .queue_bind(
            &config.queue_name,
            &config.exchange_name,
            &config.routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(EventChannelError::transport)
}

fn queue_arguments(queue_type: Option<QueueType>) -> FieldTable {
    let mut arguments = FieldTable::default();
    if let Some(kind) = queue_type {
        arguments.insert(
            QUEUE_TYPE_ARGUMENT.into(),
            AMQPValue::LongString(kind.as_str().into()),
        );
    }
    arguments
}

fn exchange_kind(kind: &str) -> ExchangeKind {
    match kind.trim().to_ascii_lowercase().as_str() {
        "direct" => ExchangeKind::Direct,
        "fanout" => ExchangeKind::Fanout,
        "headers" => ExchangeKind::Headers,
        "topic" => ExchangeKind::Topic,
        other => ExchangeKind::Custom(other.to_owned()),
    }
}
