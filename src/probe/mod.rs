//! Reachability probing for candidate addresses
//!
//! The probe issues a single GET per address and classifies the result as
//! active, seized, dead, or unreachable. It never propagates a transport
//! error: every failure mode degrades to an inactive [`ProbeResult`].

use reqwest::Client;
use std::time::{Duration, Instant};

use crate::onion::is_valid_onion;

/// Phrases indicating a law-enforcement takeover banner. Seized sites
/// return 200 OK, so status alone cannot distinguish them from live ones.
const SEIZURE_PHRASES: &[&str] = &[
    "this hidden site has been seized",
    "federal bureau of investigation",
    "operation onymous",
    "law enforcement",
];

/// Outcome of probing a single address
///
/// Transient: produced fresh per probe call, never persisted.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The probed URL
    pub url: String,

    /// Whether the site is reachable and not seized
    pub is_active: bool,

    /// Wall time to complete the request, in seconds
    pub response_time_secs: f64,

    /// HTTP status code (0 if no response was received)
    pub status_code: u16,

    /// Page title, `"[SEIZED]"`, `"No Title"`, or the `"N/A"` default
    pub title: String,
}

impl ProbeResult {
    fn inactive(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_active: false,
            response_time_secs: 0.0,
            status_code: 0,
            title: "N/A".to_string(),
        }
    }
}

/// Reachability capability consumed by the orchestrator
///
/// The trait seam lets tests substitute a stub so the run loop can be
/// exercised against mock servers whose hosts are not onion addresses.
pub trait Probe {
    fn probe(&self, url: &str) -> impl std::future::Future<Output = ProbeResult> + Send;

    /// Probes a batch of candidates, keeping only the active ones
    ///
    /// Preserves input order. Dropped addresses are logged, not surfaced
    /// as errors.
    fn filter_batch<'a>(
        &'a self,
        urls: &'a [String],
    ) -> impl std::future::Future<Output = Vec<String>> + Send + 'a
    where
        Self: Sync,
    {
        async move {
            let mut active = Vec::new();
            for url in urls {
                let result = self.probe(url).await;
                if result.is_active {
                    active.push(result.url);
                } else {
                    tracing::debug!("Dropping inactive candidate: {}", url);
                }
            }
            active
        }
    }
}

/// Probes onion addresses through the configured HTTP client
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    /// Creates a prober using an already-configured client
    ///
    /// The validation timeout is longer than the crawl timeout: a slow
    /// answer still proves the service is alive.
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl Probe for Prober {
    /// Probes a single address and classifies the outcome
    ///
    /// Syntax failures short-circuit without a network call. A 200
    /// response is scanned for seizure banners before the site counts as
    /// active.
    async fn probe(&self, url: &str) -> ProbeResult {
        let mut result = ProbeResult::inactive(url);

        if !is_valid_onion(url) {
            tracing::warn!("Invalid onion syntax: {}", url);
            return result;
        }

        tracing::info!("Probing: {}", url);
        let started = Instant::now();

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    tracing::warn!("Probe timeout: {}", url);
                } else if e.is_connect() {
                    tracing::warn!("Probe connection failed: {}", url);
                } else {
                    tracing::warn!("Probe error for {}: {}", url, e);
                }
                return result;
            }
        };

        result.status_code = response.status().as_u16();

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read probe body for {}: {}", url, e);
                result.response_time_secs = started.elapsed().as_secs_f64();
                return result;
            }
        };
        result.response_time_secs = started.elapsed().as_secs_f64();

        if result.status_code != 200 {
            tracing::warn!("Dead link ({}): {}", result.status_code, url);
            return result;
        }

        if is_seizure_notice(&body) {
            tracing::warn!("Site seized: {}", url);
            result.title = "[SEIZED]".to_string();
            return result;
        }

        result.is_active = true;
        result.title = extract_title(&body).unwrap_or_else(|| "No Title".to_string());
        tracing::info!("Active: {} ({:.2}s)", url, result.response_time_secs);
        result
    }
}

/// Returns true if the page looks like a law-enforcement seizure banner
///
/// Case-insensitive, independent of surrounding HTML.
pub fn is_seizure_notice(html: &str) -> bool {
    let lowered = html.to_lowercase();
    SEIZURE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Extracts the substring between the first `<title>` and `</title>` tags
///
/// Returns None when the tags are absent or malformed.
fn extract_title(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let end = html[start..].find("</title>")? + start;
    Some(html[start..end].to_string())
}
