//! Publisher channel with broker confirmations.

use crate::todo::ports::{EventChannelError, EventChannelResult, EventPublisher};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection,
    options::{BasicPublishOptions, ConfirmSelectOptions},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

const PERSISTENT_DELIVERY_MODE: u8 = 2;

/// Publishes completion events as persistent JSON messages.
///
/// The channel runs in confirm mode so a publish only succeeds once the
/// broker has taken responsibility for the message. A closed channel is
/// reopened on the next publish.
pub struct AmqpEventPublisher {
    connection: Arc<Connection>,
    channel: RwLock<Channel>,
}

impl AmqpEventPublisher {
    pub(super) async fn open(connection: Arc<Connection>) -> EventChannelResult<Self> {
        let channel = open_confirm_channel(&connection).await?;
        Ok(Self {
            connection,
            channel: RwLock::new(channel),
        })
    }

    async fn channel(&self) -> EventChannelResult<Channel> {
        if !self.connection.status().connected() {
            return Err(EventChannelError::Closed);
        }

        let current = self.channel.read().await;
        if current.status().connected() {
            return Ok(current.clone());
        }
        drop(current);

        warn!("publisher channel closed, reopening");
        let reopened = open_confirm_channel(&self.connection).await?;
        let mut slot = self.channel.write().await;
        *slot = reopened.clone();
        Ok(reopened)
    }
}

async fn open_confirm_channel(connection: &Connection) -> EventChannelResult<Channel> {
    let channel = connection
        .create_channel()
        .await
        .map_err(EventChannelError::transport)?;
    channel
        .confirm_select(ConfirmSelectOptions::default())
        .await
        .map_err(EventChannelError::transport)?;
    Ok(channel)
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> EventChannelResult<()> {
        let channel = self.channel().await?;
        let confirmation = channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(PERSISTENT_DELIVERY_MODE),
            )
            .await
            .map_err(EventChannelError::transport)?
            .await
            .map_err(EventChannelError::transport)?;

        if confirmation.is_nack() {
            return Err(EventChannelError::Rejected {
                exchange: exchange.to_owned(),
                routing_key: routing_key.to_owned(),
            });
        }
        Ok(())
    }
}
