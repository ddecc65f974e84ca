//! Storage trait and error types

use crate::storage::{MatchRecord, SeedRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// A storage failure halts the current run: there is no safe way to keep
/// scanning without durable health tracking.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Covers both durable tables: the seed list (health state) and the match
/// log (keyword hits). Every mutation commits atomically per call; a
/// record's health fields change together or not at all.
pub trait Storage {
    // ===== Run Management =====

    /// Records the start of a monitor run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file, for auditability
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with a completion timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Seed Store =====

    /// Returns all seeds with `is_active = true`, in stable store order
    fn list_active(&self) -> StorageResult<Vec<SeedRecord>>;

    /// Inserts a seed with default health if absent
    ///
    /// A no-op when the address already exists (rediscovery must never
    /// reset an existing failure streak) or when the address has been
    /// evicted (the permanent blocklist wins over rediscovery).
    ///
    /// # Returns
    ///
    /// `true` if a new record was inserted
    fn upsert_seed(&mut self, url: &str) -> StorageResult<bool>;

    /// Resets the failure streak after a successful fetch
    ///
    /// Sets `failure_count = 0`, `last_checked = now`, `is_active = true`.
    /// A no-op for addresses not in the seed list.
    fn record_success(&mut self, url: &str) -> StorageResult<()>;

    /// Increments the failure streak, then runs the eviction sweep
    ///
    /// The sweep is store-wide: every record at or past the threshold is
    /// deleted and added to the permanent blocklist, not just the current
    /// address. Both steps commit in one transaction.
    ///
    /// # Returns
    ///
    /// The addresses evicted by the sweep
    fn record_failure(&mut self, url: &str) -> StorageResult<Vec<String>>;

    /// Checks whether an address is on the permanent blocklist
    fn is_evicted(&self, url: &str) -> StorageResult<bool>;

    // ===== Match Store =====

    /// Writes one row per keyword in a single transaction
    ///
    /// No dedup across runs: the same (address, keyword) pair may recur on
    /// successive scans. This is an audit trail, not a finding set.
    fn append_matches(&mut self, url: &str, keywords: &[String]) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts seeds currently eligible for scanning
    fn count_active_seeds(&self) -> StorageResult<u64>;

    /// Counts all recorded keyword hits
    fn count_matches(&self) -> StorageResult<u64>;

    /// Returns the most recent matches, newest first
    fn recent_matches(&self, limit: u32) -> StorageResult<Vec<MatchRecord>>;
}
