//! Core module - server configuration, state, tasks and errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::AppState;
pub use tasks::{BackgroundTasks, TaskKind};
