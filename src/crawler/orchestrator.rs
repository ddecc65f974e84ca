//! Run orchestration - the core scan control loop
//!
//! One run is a single pass over the active seed set: each seed goes
//! through probe -> fetch -> match, with health bookkeeping written back
//! to the store after every attempt and a fixed politeness delay between
//! seeds. The store is the only cross-run memory, so the orchestrator can
//! be re-run as a cron-style job with no external state.

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::matcher::match_keywords;
use crate::crawler::pacing::Pacer;
use crate::onion::is_valid_onion;
use crate::probe::Probe;
use crate::storage::Storage;
use crate::Result;

/// Aggregate counts for one completed run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Seeds taken from the active list
    pub scanned: usize,

    /// Seeds that yielded text content
    pub succeeded: usize,

    /// Seeds that yielded no content (probe-dead, non-200, binary, error)
    pub failed: usize,

    /// Seeds with at least one keyword hit
    pub matched: usize,

    /// Seeds removed by the eviction sweep during this run
    pub evicted: usize,
}

/// Coordinates one scan pass over the seed store
///
/// Generic over the storage and reachability capabilities so a
/// non-persistent store or a stubbed probe satisfies the same loop.
pub struct Orchestrator<S: Storage, P: Probe> {
    store: S,
    prober: P,
    fetcher: Fetcher,
    pacer: Pacer,
    keywords: Vec<String>,
}

impl<S: Storage, P: Probe> Orchestrator<S, P> {
    pub fn new(store: S, prober: P, fetcher: Fetcher, pacer: Pacer, keywords: Vec<String>) -> Self {
        Self {
            store,
            prober,
            fetcher,
            pacer,
            keywords,
        }
    }

    /// Admits discovered or manually supplied addresses into the seed store
    ///
    /// Syntactically invalid addresses are dropped with a warning; the
    /// store itself refuses evicted ones. Returns the number of newly
    /// inserted seeds.
    pub fn admit_seeds<'a, I>(&mut self, addresses: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for address in addresses {
            if !is_valid_onion(address) {
                tracing::warn!("Rejecting candidate with invalid syntax: {}", address);
                continue;
            }
            if self.store.upsert_seed(address)? {
                tracing::info!("New seed admitted: {}", address);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Runs a single pass over the active seed set
    ///
    /// Terminal after one pass; there is no retry within a run. Storage
    /// errors abort the run, network failures never do.
    pub async fn run(&mut self, config_hash: &str) -> Result<RunSummary> {
        let run_id = self.store.create_run(config_hash)?;
        let seeds = self.store.list_active()?;

        let mut summary = RunSummary {
            scanned: seeds.len(),
            ..Default::default()
        };

        if seeds.is_empty() {
            tracing::info!("No active seeds; nothing to do");
            self.store.complete_run(run_id)?;
            return Ok(summary);
        }

        tracing::info!("Starting run {} over {} seeds", run_id, seeds.len());

        for seed in &seeds {
            // Unconditional politeness delay between seeds; this is the
            // sole throttle toward the network.
            self.pacer.pace().await;
            self.process_seed(&seed.url, &mut summary).await?;
        }

        self.store.complete_run(run_id)?;
        tracing::info!(
            "Run {} complete: {} scanned, {} succeeded, {} failed, {} matched, {} evicted",
            run_id,
            summary.scanned,
            summary.succeeded,
            summary.failed,
            summary.matched,
            summary.evicted
        );

        Ok(summary)
    }

    /// Probes, fetches, matches, and persists the outcome for one seed
    async fn process_seed(&mut self, url: &str, summary: &mut RunSummary) -> Result<()> {
        let probe = self.prober.probe(url).await;
        if !probe.is_active {
            tracing::debug!(
                "Seed inactive (status {}, title {:?}): {}",
                probe.status_code,
                probe.title,
                url
            );
            self.note_failure(url, summary)?;
            return Ok(());
        }

        match self.fetcher.fetch(url).await {
            FetchOutcome::Text { body } => {
                self.store.record_success(url)?;
                summary.succeeded += 1;

                let hits = match_keywords(&body, &self.keywords);
                if !hits.is_empty() {
                    tracing::info!("Match found on {}: {:?}", url, hits);
                    self.store.append_matches(url, &hits)?;
                    summary.matched += 1;
                }
            }
            FetchOutcome::BinaryQuarantined { path } => {
                // Quarantined payloads never reach the matcher and count
                // as "no text content" for health purposes.
                tracing::info!("Binary payload from {} held at {}", url, path.display());
                self.note_failure(url, summary)?;
            }
            FetchOutcome::NoContent { reason } => {
                tracing::debug!("No content from {}: {}", url, reason);
                self.note_failure(url, summary)?;
            }
        }

        Ok(())
    }

    fn note_failure(&mut self, url: &str, summary: &mut RunSummary) -> Result<()> {
        summary.failed += 1;
        let evicted = self.store.record_failure(url)?;
        for gone in &evicted {
            tracing::warn!("Seed evicted after repeated failures: {}", gone);
        }
        summary.evicted += evicted.len();
        Ok(())
    }

    /// Consumes the orchestrator, returning the store
    ///
    /// Lets callers inspect results after an ephemeral (in-memory) run.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
