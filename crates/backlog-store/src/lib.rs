//! backlog-store — Request stores, rate limiting, and configuration.
//!
//! Implements the `RequestStore` and `RateLimiter` traits from
//! `backlog-core`, and loads the `backlog.toml` configuration that wires
//! them together.

pub mod config;
pub mod json_file;
pub mod memory;
pub mod rate_limit;
mod state_file;

pub use config::{
    create_rate_limits, create_store, load_config, load_questionnaire, BacklogConfig,
    RateLimitConfig, StoreConfig,
};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use rate_limit::{FileRateLimiter, FixedWindowLimiter};
