//! Stream boundary: message source and dead-letter sink
//!
//! The pipeline consumes an ordered sequence of (payload bytes, position)
//! pairs and acknowledges positions explicitly. The payload is opaque at
//! this layer; decoding happens in the ingest worker so serialization
//! failures stay separate from transport failures.

pub mod dead_letter;
pub mod source;

pub use dead_letter::{DeadLetterSink, KafkaDeadLetter};
pub use source::{KafkaSource, StreamSource};

/// Per-partition position of a message, used to acknowledge consumption and
/// to resume after restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPosition {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// One message as pulled from the stream: raw payload plus the position
/// marker needed to commit it.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub payload: Vec<u8>,
    pub position: StreamPosition,
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream fetch failed: {0}")]
    Fetch(String),

    #[error("offset commit failed: {0}")]
    Commit(String),

    #[error("dead-letter publish failed: {0}")]
    Publish(String),

    #[error("stream client configuration failed: {0}")]
    Config(String),
}
