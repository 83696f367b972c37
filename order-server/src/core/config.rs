//! Server configuration
//!
//! Every setting can be overridden through an environment variable:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | HTTP_PORT | 8080 | HTTP query surface port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | DATABASE_URL | postgres://localhost/orders | Postgres connection string |
//! | DB_MAX_CONNECTIONS | 5 | connection pool size |
//! | KAFKA_BROKERS | localhost:9092 | bootstrap broker list |
//! | KAFKA_TOPIC | orders | order topic to consume |
//! | KAFKA_GROUP_ID | order-server | consumer group id |
//! | DEAD_LETTER_TOPIC | orders-dlq | dead-letter topic |
//! | CACHE_CAPACITY | 1000 | max cached orders |
//! | CACHE_TTL_SECS | 900 | entry time-to-live since last touch |
//! | CACHE_SWEEP_INTERVAL_SECS | 60 | periodic expiry sweep interval |
//! | REPORT_CHANNEL_CAPACITY | 100 | bounded pipeline-error channel |
//! | SHUTDOWN_TIMEOUT_MS | 10000 | grace period for background tasks |

use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP query surface port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Durable store ===
    pub database_url: String,
    pub db_max_connections: u32,

    // === Stream ===
    pub kafka_brokers: String,
    pub kafka_topic: String,
    pub kafka_group_id: String,
    pub dead_letter_topic: String,

    // === Cache ===
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,

    // === Observability / lifecycle ===
    pub report_channel_capacity: usize,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            http_port: env_or("HTTP_PORT", 8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/orders".into()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| "localhost:9092".into()),
            kafka_topic: std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| "orders".into()),
            kafka_group_id: std::env::var("KAFKA_GROUP_ID")
                .unwrap_or_else(|_| "order-server".into()),
            dead_letter_topic: std::env::var("DEAD_LETTER_TOPIC")
                .unwrap_or_else(|_| "orders-dlq".into()),
            cache_capacity: env_or("CACHE_CAPACITY", 1000),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 900),
            cache_sweep_interval_secs: env_or("CACHE_SWEEP_INTERVAL_SECS", 60),
            report_channel_capacity: env_or("REPORT_CHANNEL_CAPACITY", 100),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// Reject configurations the components would refuse anyway, before any
    /// connection is attempted.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_capacity == 0 {
            anyhow::bail!("CACHE_CAPACITY must be positive");
        }
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("CACHE_TTL_SECS must be positive");
        }
        if self.cache_sweep_interval_secs == 0 {
            anyhow::bail!("CACHE_SWEEP_INTERVAL_SECS must be positive");
        }
        if self.report_channel_capacity == 0 {
            anyhow::bail!("REPORT_CHANNEL_CAPACITY must be positive");
        }
        for (name, value) in [
            ("DATABASE_URL", &self.database_url),
            ("KAFKA_BROKERS", &self.kafka_brokers),
            ("KAFKA_TOPIC", &self.kafka_topic),
            ("KAFKA_GROUP_ID", &self.kafka_group_id),
            ("DEAD_LETTER_TOPIC", &self.dead_letter_topic),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            http_port: 0,
            environment: "development".into(),
            database_url: "postgres://localhost/orders".into(),
            db_max_connections: 5,
            kafka_brokers: "localhost:9092".into(),
            kafka_topic: "orders".into(),
            kafka_group_id: "order-server".into(),
            dead_letter_topic: "orders-dlq".into(),
            cache_capacity: 10,
            cache_ttl_secs: 60,
            cache_sweep_interval_secs: 60,
            report_channel_capacity: 16,
            shutdown_timeout_ms: 1000,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let mut config = base();
        config.cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = base();
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_environment_is_detected() {
        let mut config = base();
        assert!(!config.is_production());
        config.environment = "production".into();
        assert!(config.is_production());
    }

    #[test]
    fn blank_topic_is_rejected() {
        let mut config = base();
        config.kafka_topic = "  ".into();
        assert!(config.validate().is_err());
    }
}
