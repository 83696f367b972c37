//! Kafka-backed stream source
//!
//! Auto-commit is disabled; the ingest worker owns commit sequencing and
//! acknowledges a position only once the message's outcome is resolved.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};

use super::{StreamError, StreamMessage, StreamPosition};

/// Ordered message source over one partition (or a consumer-group share of
/// partitions; group semantics are the broker's business).
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Pull the next message, suspending until one is available.
    async fn fetch(&self) -> Result<StreamMessage, StreamError>;

    /// Acknowledge consumption of every offset up to and including
    /// `position` on its partition.
    async fn ack(&self, position: &StreamPosition) -> Result<(), StreamError>;
}

pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    pub fn connect(brokers: &str, group_id: &str, topic: &str) -> Result<Self, StreamError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| StreamError::Config(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| StreamError::Config(e.to_string()))?;

        tracing::info!(brokers, group_id, topic, "kafka consumer subscribed");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl StreamSource for KafkaSource {
    async fn fetch(&self) -> Result<StreamMessage, StreamError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| StreamError::Fetch(e.to_string()))?;

        Ok(StreamMessage {
            payload: message.payload().unwrap_or_default().to_vec(),
            position: StreamPosition {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
            },
        })
    }

    async fn ack(&self, position: &StreamPosition) -> Result<(), StreamError> {
        // Kafka commits the *next* offset to consume.
        let mut assignment = TopicPartitionList::new();
        assignment
            .add_partition_offset(
                &position.topic,
                position.partition,
                Offset::Offset(position.offset + 1),
            )
            .map_err(|e| StreamError::Commit(e.to_string()))?;

        self.consumer
            .commit(&assignment, CommitMode::Sync)
            .map_err(|e| StreamError::Commit(e.to_string()))
    }
}
