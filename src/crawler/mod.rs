//! Crawler module for the scan pipeline
//!
//! Contains the pieces the orchestrator runs each seed through:
//! - HTTP client construction and the content fetcher
//! - Binary quarantine branching
//! - Keyword matching
//! - Politeness pacing
//! - The run orchestration loop itself

mod fetcher;
mod matcher;
mod orchestrator;
mod pacing;

pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use matcher::match_keywords;
pub use orchestrator::{Orchestrator, RunSummary};
pub use pacing::Pacer;
