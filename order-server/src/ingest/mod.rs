//! Consumer loop
//!
//! Pulls messages from the stream one at a time and drives each through
//! `Received → Validating → {Persisting | DeadLettering} → Committing`.
//!
//! Commit policy: the offset is acknowledged iff the message reached a
//! resolved outcome — the order was persisted, or the payload was handed to
//! the dead-letter sink. A message that is neither stored nor dead-lettered
//! leaves its offset uncommitted so the broker redelivers it; persistence is
//! an idempotent upsert, so reprocessing is safe.
//!
//! Processing is strictly sequential per worker, which preserves in-order
//! commits within a partition: the next message is not pulled until the
//! current one's outcome (and commit attempt) is finished.

pub mod report;


use std::sync::Arc;
use std::time::Duration;

use shared::Order;
use tokio_util::sync::CancellationToken;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::cache::OrderCache;
use crate::store::OrderStore;
use crate::stream::{DeadLetterSink, StreamMessage, StreamSource};

pub use report::{PipelineError, Reporter, drain_reports};

/// Initial delay after a transport-level fetch failure.
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Backoff cap for repeated fetch failures.
const MAX_FETCH_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Resolution of one message. Only a resolved outcome commits the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Persisted to the durable store (and cached).
    Persisted,
    /// Handed to the dead-letter sink.
    DeadLettered,
    /// Neither persisted nor dead-lettered; leave the offset uncommitted.
    Unresolved,
}

pub struct IngestWorker {
    source: Arc<dyn StreamSource>,
    dead_letter: Arc<dyn DeadLetterSink>,
    store: Arc<dyn OrderStore>,
    cache: Arc<OrderCache>,
    reporter: Reporter,
    shutdown: CancellationToken,
}

impl IngestWorker {
    pub fn new(
        source: Arc<dyn StreamSource>,
        dead_letter: Arc<dyn DeadLetterSink>,
        store: Arc<dyn OrderStore>,
        cache: Arc<OrderCache>,
        reporter: Reporter,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            dead_letter,
            store,
            cache,
            reporter,
            shutdown,
        }
    }

    /// Main loop: fetch, process, commit, until shutdown.
    ///
    /// Cancellation is observed while waiting for the next message; a
    /// message already in flight finishes processing (including its commit
    /// attempt) before the loop exits.
    pub async fn run(self) {
        tracing::info!("ingest worker started");
        let mut retry_delay = FETCH_RETRY_DELAY;

        loop {
            let message = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                fetched = self.source.fetch() => match fetched {
                    Ok(message) => {
                        retry_delay = FETCH_RETRY_DELAY;
                        message
                    }
                    Err(e) => {
                        self.reporter.report(PipelineError::Fetch {
                            reason: e.to_string(),
                        });
                        tokio::select! {
                            _ = self.shutdown.cancelled() => break,
                            _ = tokio::time::sleep(retry_delay) => {}
                        }
                        retry_delay = (retry_delay * 2).min(MAX_FETCH_RETRY_DELAY);
                        continue;
                    }
                },
            };

            self.handle(message).await;
        }

        tracing::info!("ingest worker stopped");
    }

    /// Process one message through to its commit decision.
    async fn handle(&self, message: StreamMessage) {
        let outcome = self.process(&message).await;

        match outcome {
            Outcome::Persisted | Outcome::DeadLettered => {
                if let Err(e) = self.source.ack(&message.position).await {
                    self.reporter.report(PipelineError::Commit {
                        topic: message.position.topic.clone(),
                        partition: message.position.partition,
                        offset: message.position.offset,
                        reason: e.to_string(),
                    });
                }
            }
            Outcome::Unresolved => {
                tracing::warn!(
                    topic = %message.position.topic,
                    partition = message.position.partition,
                    offset = message.position.offset,
                    "offset left uncommitted, message will be redelivered"
                );
            }
        }
    }

    async fn process(&self, message: &StreamMessage) -> Outcome {
        // Decode is a separate step from transport: a payload that is not
        // an order at all is poison, not a stream failure.
        let order: Order = match serde_json::from_slice(&message.payload) {
            Ok(order) => order,
            Err(e) => {
                self.reporter.report(PipelineError::Decode {
                    reason: e.to_string(),
                });
                return self.dead_letter(None, &message.payload).await;
            }
        };

        if let Err(errors) = order.validate() {
            log_violations(&order.order_uid, "", &errors);
            self.reporter.report(PipelineError::Validation {
                order_uid: order.order_uid.clone(),
                reason: errors.to_string(),
            });
            // Never persist an invalid order.
            return self
                .dead_letter(Some(&order.order_uid), &message.payload)
                .await;
        }

        match self.store.persist(&order).await {
            Ok(()) => {
                self.cache.put(&order);
                tracing::debug!(order_uid = %order.order_uid, "order persisted");
                Outcome::Persisted
            }
            Err(e) => {
                self.reporter.report(PipelineError::Persistence {
                    order_uid: order.order_uid.clone(),
                    reason: e.to_string(),
                });
                // Forward the payload, not the error.
                self.dead_letter(Some(&order.order_uid), &message.payload)
                    .await
            }
        }
    }

    async fn dead_letter(&self, key: Option<&str>, payload: &[u8]) -> Outcome {
        match self.dead_letter.publish(key, payload).await {
            Ok(()) => {
                tracing::warn!(order_uid = key.unwrap_or("<undecodable>"), "message dead-lettered");
                Outcome::DeadLettered
            }
            Err(e) => {
                self.reporter.report(PipelineError::DeadLetter {
                    reason: e.to_string(),
                });
                Outcome::Unresolved
            }
        }
    }
}

/// Emit one diagnostic per violated constraint, recursing into nested
/// sub-records and item lists.
fn log_violations(order_uid: &str, prefix: &str, errors: &ValidationErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(violations) => {
                for violation in violations {
                    tracing::warn!(
                        order_uid,
                        field = %path,
                        constraint = %violation.code,
                        "validation failed"
                    );
                }
            }
            ValidationErrorsKind::Struct(nested) => log_violations(order_uid, &path, nested),
            ValidationErrorsKind::List(per_index) => {
                for (index, nested) in per_index {
                    log_violations(order_uid, &format!("{path}[{index}]"), nested);
                }
            }
        }
    }
}
