//! Bounded, best-effort pipeline event reporting
//!
//! Stage failures are pushed onto a bounded channel and logged by a drain
//! task. When the channel is full the event is dropped: the loop's forward
//! progress takes priority over error delivery, so observability can lose
//! events under sustained overload. That is accepted behavior.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Failure taxonomy of the ingestion pipeline. None of these terminate the
/// process; they exist for observability and for the commit decision.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The payload bytes did not decode to an order at all.
    #[error("payload failed to decode: {reason}")]
    Decode { reason: String },

    /// The decoded order violated structural constraints. Routed to the
    /// dead-letter sink, never retried as-is.
    #[error("order {order_uid} failed validation: {reason}")]
    Validation { order_uid: String, reason: String },

    /// The durable store rejected the write or was unavailable. Retried
    /// only via redelivery when the offset was not committed.
    #[error("order {order_uid} failed to persist: {reason}")]
    Persistence { order_uid: String, reason: String },

    /// The dead-letter sink was unavailable.
    #[error("dead-letter publish failed: {reason}")]
    DeadLetter { reason: String },

    /// Offset acknowledge failed. Non-fatal: the message may be redelivered
    /// and reprocessed, and persistence is an idempotent upsert.
    #[error("offset commit failed at {topic}[{partition}]@{offset}: {reason}")]
    Commit {
        topic: String,
        partition: i32,
        offset: i64,
        reason: String,
    },

    /// Transport-level pull failure; the worker backs off and retries.
    #[error("stream fetch failed: {reason}")]
    Fetch { reason: String },
}

/// Fire-and-forget handle onto the report channel.
#[derive(Clone)]
pub struct Reporter {
    tx: mpsc::Sender<PipelineError>,
}

impl Reporter {
    /// Create a bounded report channel. The receiver goes to
    /// [`drain_reports`], the sender is cloned into the workers.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PipelineError>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn report(&self, error: PipelineError) {
        match self.tx.try_send(error) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!(error = %dropped, "report channel full, event dropped");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Drain worker: logs every reported pipeline error until shutdown or until
/// all senders are gone.
pub async fn drain_reports(mut rx: mpsc::Receiver<PipelineError>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = rx.recv() => match received {
                Some(error) => tracing::error!(error = %error, "pipeline error"),
                None => break,
            },
        }
    }
    tracing::debug!("report drain stopped");
}
