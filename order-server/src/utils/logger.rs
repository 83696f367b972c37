//! Logging Infrastructure
//!
//! Structured logging setup. The filter comes from `RUST_LOG` when set,
//! otherwise from the provided default level.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with an optional default level and optional daily
/// rolling file output. Output goes to stdout unless a log directory is
/// given and exists.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let default_level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "order-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
