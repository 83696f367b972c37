//! Server assembly and lifecycle
//!
//! Startup order matters: the cache is warmed from the store *before* the
//! ingest worker can commit new offsets and before the HTTP surface accepts
//! traffic. A failed warm-up aborts startup.

use std::sync::Arc;

use anyhow::Context;

use crate::core::AppState;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::ingest::{IngestWorker, Reporter, drain_reports};
use crate::query;
use crate::routes;
use crate::stream::{DeadLetterSink, StreamSource};

pub struct Server {
    state: AppState,
    source: Arc<dyn StreamSource>,
    dead_letter: Arc<dyn DeadLetterSink>,
}

impl Server {
    pub fn new(
        state: AppState,
        source: Arc<dyn StreamSource>,
        dead_letter: Arc<dyn DeadLetterSink>,
    ) -> Self {
        Self {
            state,
            source,
            dead_letter,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let state = self.state;
        let config = state.config.clone();

        // 1. Bootstrap: warm the cache or refuse to start.
        query::warm_cache(state.store.as_ref(), &state.cache)
            .await
            .context("bootstrap cache warm-up failed")?;

        // 2. Background tasks: pipeline reporting, expiry sweep, ingestion.
        let (reporter, reports) = Reporter::channel(config.report_channel_capacity);
        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        tasks.spawn(
            "report_drain",
            TaskKind::Drain,
            drain_reports(reports, shutdown.clone()),
        );
        tasks.spawn(
            "cache_sweeper",
            TaskKind::Periodic,
            Arc::clone(&state.cache).run_sweeper(config.sweep_interval(), shutdown.clone()),
        );
        let worker = IngestWorker::new(
            self.source,
            self.dead_letter,
            Arc::clone(&state.store),
            Arc::clone(&state.cache),
            reporter,
            shutdown.clone(),
        );
        tasks.spawn("ingest_worker", TaskKind::Worker, worker.run());

        // 3. HTTP query surface.
        let router = routes::router(state);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port))
            .await
            .with_context(|| format!("failed to bind port {}", config.http_port))?;
        tracing::info!(
            port = config.http_port,
            environment = %config.environment,
            "order server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("http server failed")?;

        // 4. Stop background work, bounded by the configured grace period.
        if tokio::time::timeout(config.shutdown_timeout(), tasks.shutdown())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_ms = config.shutdown_timeout_ms,
                "background tasks did not stop within the grace period"
            );
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
