//! Shared types used across the commerce service crates.

mod types;

pub use types::{Money, OrderNo, ProductId, UserId};
