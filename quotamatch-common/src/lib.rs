//! # QuotaMatch Common Library
//!
//! Shared code for the QuotaMatch engine and its hosts including:
//! - Error types (Error enum and Result alias)
//! - Event types (MatchEvent enum) and the EventBus
//! - Configuration and store-path resolution
//! - SQLite pool initialization and identifier quoting

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
