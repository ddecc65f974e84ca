//! Storage module for durable seed health and match records
//!
//! The [`Storage`] trait is the capability injected into the orchestrator.
//! Two implementations exist: [`SqliteStorage`] for cross-run durability
//! and [`MemoryStorage`] for ephemeral one-shot scans.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// A seed is deleted once its failure streak reaches this count
pub const EVICTION_THRESHOLD: u32 = 3;

/// Durable record of a known address and its health state
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRecord {
    /// The address (unique key)
    pub url: String,

    /// RFC 3339 timestamp of the last probe/fetch attempt
    pub last_checked: Option<String>,

    /// Consecutive failures since the last success
    pub failure_count: u32,

    /// Whether the seed is eligible for scanning
    pub is_active: bool,
}

/// Append-only record of a keyword hit
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Auto-assigned sequence id
    pub id: i64,

    /// The address the keyword was found on
    pub url: String,

    /// The keyword that matched
    pub keyword: String,

    /// RFC 3339 timestamp of the write
    pub timestamp: String,
}
