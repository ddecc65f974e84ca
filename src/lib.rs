//! Onionwatch: a hidden-service keyword monitor
//!
//! This crate implements a crawler that validates and periodically re-crawls
//! v3 onion addresses through a local SOCKS proxy, scanning fetched pages for
//! operator-supplied keywords and persisting seed health and keyword hits.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod onion;
pub mod probe;
pub mod storage;
pub mod tor;

use thiserror::Error;

/// Main error type for onionwatch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Control channel error: {0}")]
    Control(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for onionwatch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{FetchOutcome, Orchestrator, RunSummary};
pub use onion::is_valid_onion;
pub use probe::{Probe, ProbeResult, Prober};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
