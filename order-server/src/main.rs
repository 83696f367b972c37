use std::sync::Arc;

use order_server::core::AppState;
use order_server::store::PgStore;
use order_server::stream::{KafkaDeadLetter, KafkaSource};
use order_server::{Config, OrderCache, Server, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let default_level = if config.is_production() { "info" } else { "debug" };
    init_logger(Some(default_level), None);

    tracing::info!("order server starting...");
    config.validate()?;

    let store = Arc::new(PgStore::connect(&config.database_url, config.db_max_connections).await?);
    let cache = Arc::new(OrderCache::new(config.cache_capacity, config.cache_ttl())?);
    let source = Arc::new(KafkaSource::connect(
        &config.kafka_brokers,
        &config.kafka_group_id,
        &config.kafka_topic,
    )?);
    let dead_letter = Arc::new(KafkaDeadLetter::connect(
        &config.kafka_brokers,
        &config.dead_letter_topic,
    )?);

    let state = AppState::new(config, cache, store);
    let server = Server::new(state, source, dead_letter);

    if let Err(e) = server.run().await {
        tracing::error!(error = ?e, "server error");
        return Err(e);
    }

    Ok(())
}
