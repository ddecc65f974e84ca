//! SQLite storage implementation

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{MatchRecord, SeedRecord, EVICTION_THRESHOLD};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates a database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn seed_row(row: &rusqlite::Row) -> rusqlite::Result<SeedRecord> {
        Ok(SeedRecord {
            url: row.get(0)?,
            last_checked: row.get(1)?,
            failure_count: row.get(2)?,
            is_active: row.get::<_, i64>(3)? != 0,
        })
    }
}

impl Storage for SqliteStorage {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![now, config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1 WHERE id = ?2",
            params![now, run_id],
        )?;
        Ok(())
    }

    fn list_active(&self) -> StorageResult<Vec<SeedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, last_checked, failure_count, is_active
             FROM seed_list WHERE is_active = 1 ORDER BY url",
        )?;

        let seeds = stmt
            .query_map([], Self::seed_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(seeds)
    }

    fn upsert_seed(&mut self, url: &str) -> StorageResult<bool> {
        if self.is_evicted(url)? {
            tracing::debug!("Refusing to re-seed evicted address: {}", url);
            return Ok(false);
        }

        // INSERT OR IGNORE: an existing record keeps its health fields
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO seed_list (url, is_active, failure_count) VALUES (?1, 1, 0)",
            params![url],
        )?;
        Ok(inserted > 0)
    }

    fn record_success(&mut self, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE seed_list SET failure_count = 0, last_checked = ?1, is_active = 1
             WHERE url = ?2",
            params![now, url],
        )?;
        Ok(())
    }

    fn record_failure(&mut self, url: &str) -> StorageResult<Vec<String>> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "UPDATE seed_list SET failure_count = failure_count + 1, last_checked = ?1
             WHERE url = ?2",
            params![now, url],
        )?;

        // Store-wide sweep: every record past the threshold goes, not just
        // the current address.
        let evicted: Vec<(String, u32)> = {
            let mut stmt = tx.prepare(
                "SELECT url, failure_count FROM seed_list WHERE failure_count >= ?1",
            )?;
            let rows = stmt
                .query_map(params![EVICTION_THRESHOLD], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for (evicted_url, failures) in &evicted {
            tx.execute(
                "INSERT OR REPLACE INTO evicted_seeds (url, evicted_at, failure_count)
                 VALUES (?1, ?2, ?3)",
                params![evicted_url, now, failures],
            )?;
        }

        tx.execute(
            "DELETE FROM seed_list WHERE failure_count >= ?1",
            params![EVICTION_THRESHOLD],
        )?;

        tx.commit()?;

        Ok(evicted.into_iter().map(|(u, _)| u).collect())
    }

    fn is_evicted(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM evicted_seeds WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn append_matches(&mut self, url: &str, keywords: &[String]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for keyword in keywords {
            tx.execute(
                "INSERT INTO matches (url, keyword, timestamp) VALUES (?1, ?2, ?3)",
                params![url, keyword, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn count_active_seeds(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM seed_list WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_matches(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn recent_matches(&self, limit: u32) -> StorageResult<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, keyword, timestamp FROM matches ORDER BY id DESC LIMIT ?1",
        )?;

        let matches = stmt
            .query_map(params![limit], |row| {
                Ok(MatchRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    keyword: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onion(seed: char) -> String {
        format!("http://{}.onion", seed.to_string().repeat(56))
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_upsert_inserts_with_defaults() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.upsert_seed(&onion('a')).unwrap());

        let seeds = storage.list_active().unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].failure_count, 0);
        assert!(seeds[0].is_active);
        assert!(seeds[0].last_checked.is_none());
    }

    #[test]
    fn test_upsert_never_resets_existing_streak() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let url = onion('a');
        storage.upsert_seed(&url).unwrap();
        storage.record_failure(&url).unwrap();
        storage.record_failure(&url).unwrap();

        // Rediscovery of the same address must not touch health fields
        assert!(!storage.upsert_seed(&url).unwrap());
        let seeds = storage.list_active().unwrap();
        assert_eq!(seeds[0].failure_count, 2);
    }

    #[test]
    fn test_success_resets_streak() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let url = onion('a');
        storage.upsert_seed(&url).unwrap();
        storage.record_failure(&url).unwrap();
        storage.record_failure(&url).unwrap();
        storage.record_success(&url).unwrap();

        let seeds = storage.list_active().unwrap();
        assert_eq!(seeds[0].failure_count, 0);
        assert!(seeds[0].last_checked.is_some());

        // A fresh failure sequence starts from zero again
        storage.record_failure(&url).unwrap();
        storage.record_failure(&url).unwrap();
        assert_eq!(storage.list_active().unwrap().len(), 1);
    }

    #[test]
    fn test_three_strikes_evicts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let url = onion('a');
        storage.upsert_seed(&url).unwrap();

        assert!(storage.record_failure(&url).unwrap().is_empty());
        assert!(storage.record_failure(&url).unwrap().is_empty());
        let evicted = storage.record_failure(&url).unwrap();

        assert_eq!(evicted, vec![url.clone()]);
        assert!(storage.list_active().unwrap().is_empty());
        assert!(storage.is_evicted(&url).unwrap());
    }

    #[test]
    fn test_eviction_blocks_rediscovery() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let url = onion('a');
        storage.upsert_seed(&url).unwrap();
        for _ in 0..3 {
            storage.record_failure(&url).unwrap();
        }

        // A later discovery pass must not resurrect the seed
        assert!(!storage.upsert_seed(&url).unwrap());
        assert!(storage.list_active().unwrap().is_empty());
    }

    #[test]
    fn test_sweep_is_store_wide() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let a = onion('a');
        let b = onion('b');
        storage.upsert_seed(&a).unwrap();
        storage.upsert_seed(&b).unwrap();

        storage.record_failure(&a).unwrap();
        storage.record_failure(&a).unwrap();
        storage.record_failure(&b).unwrap();

        // Third strike on a evicts a but leaves b (one failure) alone
        let evicted = storage.record_failure(&a).unwrap();
        assert_eq!(evicted, vec![a]);
        let remaining = storage.list_active().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].url, b);
    }

    #[test]
    fn test_append_matches_one_row_per_keyword() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let url = onion('a');
        storage
            .append_matches(&url, &["secret".to_string(), "password".to_string()])
            .unwrap();

        assert_eq!(storage.count_matches().unwrap(), 2);

        // No dedup across scans: the same pair may be recorded again
        storage.append_matches(&url, &["secret".to_string()]).unwrap();
        assert_eq!(storage.count_matches().unwrap(), 3);

        let recent = storage.recent_matches(10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].keyword, "secret");
    }

    #[test]
    fn test_health_writes_on_unknown_address_are_noops() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.record_success(&onion('a')).is_ok());
        assert!(storage.record_failure(&onion('a')).unwrap().is_empty());
        assert!(storage.list_active().unwrap().is_empty());
        assert!(!storage.is_evicted(&onion('a')).unwrap());
    }

    #[test]
    fn test_run_bookkeeping() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc123").unwrap();
        assert!(run_id > 0);
        assert!(storage.complete_run(run_id).is_ok());
    }
}
