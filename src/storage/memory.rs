//! In-memory storage implementation
//!
//! Satisfies the same [`Storage`] interface as the SQLite backend but
//! keeps everything in process memory. Used for ephemeral one-shot scans
//! where cross-run durability is not wanted.

use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{MatchRecord, SeedRecord, EVICTION_THRESHOLD};
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};

/// Non-persistent storage backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    // BTreeMap keeps list_active order stable, matching the SQLite backend
    seeds: BTreeMap<String, SeedRecord>,
    evicted: HashSet<String>,
    matches: Vec<MatchRecord>,
    next_run_id: i64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn create_run(&mut self, _config_hash: &str) -> StorageResult<i64> {
        self.next_run_id += 1;
        Ok(self.next_run_id)
    }

    fn complete_run(&mut self, _run_id: i64) -> StorageResult<()> {
        Ok(())
    }

    fn list_active(&self) -> StorageResult<Vec<SeedRecord>> {
        Ok(self
            .seeds
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    fn upsert_seed(&mut self, url: &str) -> StorageResult<bool> {
        if self.evicted.contains(url) || self.seeds.contains_key(url) {
            return Ok(false);
        }
        self.seeds.insert(
            url.to_string(),
            SeedRecord {
                url: url.to_string(),
                last_checked: None,
                failure_count: 0,
                is_active: true,
            },
        );
        Ok(true)
    }

    fn record_success(&mut self, url: &str) -> StorageResult<()> {
        if let Some(seed) = self.seeds.get_mut(url) {
            seed.failure_count = 0;
            seed.last_checked = Some(Utc::now().to_rfc3339());
            seed.is_active = true;
        }
        Ok(())
    }

    fn record_failure(&mut self, url: &str) -> StorageResult<Vec<String>> {
        if let Some(seed) = self.seeds.get_mut(url) {
            seed.failure_count += 1;
            seed.last_checked = Some(Utc::now().to_rfc3339());
        }

        let swept: Vec<String> = self
            .seeds
            .values()
            .filter(|s| s.failure_count >= EVICTION_THRESHOLD)
            .map(|s| s.url.clone())
            .collect();

        for evicted_url in &swept {
            self.seeds.remove(evicted_url);
            self.evicted.insert(evicted_url.clone());
        }

        Ok(swept)
    }

    fn is_evicted(&self, url: &str) -> StorageResult<bool> {
        Ok(self.evicted.contains(url))
    }

    fn append_matches(&mut self, url: &str, keywords: &[String]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        for keyword in keywords {
            let id = self.matches.len() as i64 + 1;
            self.matches.push(MatchRecord {
                id,
                url: url.to_string(),
                keyword: keyword.clone(),
                timestamp: now.clone(),
            });
        }
        Ok(())
    }

    fn count_active_seeds(&self) -> StorageResult<u64> {
        Ok(self.seeds.values().filter(|s| s.is_active).count() as u64)
    }

    fn count_matches(&self) -> StorageResult<u64> {
        Ok(self.matches.len() as u64)
    }

    fn recent_matches(&self, limit: u32) -> StorageResult<Vec<MatchRecord>> {
        Ok(self
            .matches
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
