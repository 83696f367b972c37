//! Shared types for the order service
//!
//! The wire-format order model and its structural validation rules, used by
//! the server crate and by test fixtures.

pub mod order;

pub use order::{Delivery, Item, Order, Payment};
pub use serde::{Deserialize, Serialize};
