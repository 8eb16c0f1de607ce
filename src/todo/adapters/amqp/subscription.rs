//! Consumer subscription with manual acknowledgement.

use crate::todo::ports::{
    Delivery, DeliveryAcker, EventChannelError, EventChannelResult, EventSubscription,
};
use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    Channel, Consumer,
    acker::Acker,
    options::{BasicAckOptions, BasicNackOptions},
    types::{AMQPValue, FieldTable},
};

/// Header quorum queues use to report prior delivery attempts.
const DELIVERY_COUNT_HEADER: &str = "x-delivery-count";

/// Consumer bound to the completion queue.
///
/// Owns its channel; [`EventSubscription::close`] closes it, which returns
/// any unacknowledged deliveries to the queue.
pub struct AmqpSubscription {
    channel: Channel,
    consumer: Consumer,
}

impl AmqpSubscription {
    pub(super) const fn new(channel: Channel, consumer: Consumer) -> Self {
        Self { channel, consumer }
    }
}

#[async_trait]
impl EventSubscription for AmqpSubscription {
    async fn next_delivery(&mut self) -> Option<EventChannelResult<Delivery>> {
        let next = self.consumer.next().await?;
        Some(next.map(into_delivery).map_err(EventChannelError::transport))
    }

    async fn close(&mut self) -> EventChannelResult<()> {
        if !self.channel.status().connected() {
            return Ok(());
        }
        self.channel
            .close(200, "worker shutdown")
            .await
            .map_err(EventChannelError::transport)
    }
}

fn into_delivery(delivery: lapin::message::Delivery) -> Delivery {
    let delivery_count = delivery
        .properties
        .headers()
        .as_ref()
        .and_then(header_delivery_count);
    let acker = AmqpAcker {
        acker: delivery.acker,
    };
    let mut converted =
        Delivery::new(delivery.data, Box::new(acker)).with_redelivered(delivery.redelivered);
    if let Some(count) = delivery_count {
        converted = converted.with_delivery_count(count);
    }
    converted
}

fn header_delivery_count(headers: &FieldTable) -> Option<u32> {
    let (_, value) = headers
        .inner()
        .iter()
        .find(|(name, _)| name.as_str() == DELIVERY_COUNT_HEADER)?;
    match value {
        AMQPValue::LongLongInt(count) => u32::try_from(*count).ok(),
        AMQPValue::LongInt(count) => u32::try_from(*count).ok(),
        AMQPValue::LongUInt(count) => Some(*count),
        AMQPValue::ShortInt(count) => u32::try_from(*count).ok(),
        AMQPValue::ShortUInt(count) => Some(u32::from(*count)),
        _ => None,
    }
}

struct AmqpAcker {
    acker: Acker,
}

#[async_trait]
impl DeliveryAcker for AmqpAcker {
    async fn ack(&self) -> EventChannelResult<()> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map(|_| ())
            .map_err(EventChannelError::transport)
    }

    async fn nack(&self, requeue: bool) -> EventChannelResult<()> {
        self.acker
            .nack(BasicNackOptions {
                multiple: false,
                requeue,
            })
            .await
            .map(|_| ())
            .map_err(EventChannelError::transport)
    }
}
