//! Dead-letter sink
//!
//! Unprocessable messages are forwarded verbatim to a side topic for manual
//! inspection or reprocessing. Fire-and-forget from the pipeline's
//! perspective; nothing reads the topic back.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};

use super::StreamError;

#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Publish the raw payload of an unprocessable message. The key, when
    /// the payload decoded far enough to have one, is the order uid.
    async fn publish(&self, key: Option<&str>, payload: &[u8]) -> Result<(), StreamError>;
}

pub struct KafkaDeadLetter {
    producer: FutureProducer,
    topic: String,
}

impl KafkaDeadLetter {
    pub fn connect(brokers: &str, topic: &str) -> Result<Self, StreamError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| StreamError::Config(e.to_string()))?;

        tracing::info!(brokers, topic, "dead-letter producer ready");
        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl DeadLetterSink for KafkaDeadLetter {
    async fn publish(&self, key: Option<&str>, payload: &[u8]) -> Result<(), StreamError> {
        let record: FutureRecord<'_, str, [u8]> = match key {
            Some(key) => FutureRecord::to(&self.topic).payload(payload).key(key),
            None => FutureRecord::to(&self.topic).payload(payload),
        };

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map(|_| ())
            .map_err(|(e, _)| StreamError::Publish(e.to_string()))
    }
}
