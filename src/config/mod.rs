//! Configuration loading and validation
//!
//! Configuration is a single TOML file covering the proxy endpoints, the
//! monitor timings, output paths, keywords, and seed sources.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, MonitorConfig, NetworkConfig, OutputConfig, SeedingConfig};
pub use validation::validate;
