//! Seed discovery from directory and index pages
//!
//! Scrapes known hidden-service directories for candidate v3 addresses.
//! Every source failure is logged and skipped; discovery never aborts the
//! process. The orchestrator consumes the output solely through seed
//! admission, so discovery holds no state of its own.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;

/// Scrapes directory pages for candidate onion addresses
pub struct SeedDiscoverer {
    client: Client,
    timeout: Duration,
    onion_pattern: Regex,
}

impl SeedDiscoverer {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            // v3 addresses embedded anywhere in an href
            onion_pattern: Regex::new(r"[a-z2-7]{56}\.onion").expect("static pattern"),
        }
    }

    /// Fetches each source page and extracts unique candidate addresses
    ///
    /// Results are normalized to `http://<addr>.onion`. Sources that fail
    /// to fetch or parse contribute nothing.
    pub async fn discover_seeds(&self, sources: &[String]) -> HashSet<String> {
        let mut found = HashSet::new();
        for source in sources {
            match self.fetch_source(source).await {
                Ok(addresses) => {
                    tracing::info!("Discovered {} candidates from {}", addresses.len(), source);
                    found.extend(addresses);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch seeds from {}: {}", source, e);
                }
            }
        }
        found
    }

    async fn fetch_source(&self, source: &str) -> Result<HashSet<String>, reqwest::Error> {
        tracing::info!("Seeding from: {}", source);
        let response = self
            .client
            .get(source)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(self.extract_addresses(&body))
    }

    /// Pulls candidate addresses out of every anchor href on the page
    fn extract_addresses(&self, html: &str) -> HashSet<String> {
        let document = Html::parse_document(html);
        let mut addresses = HashSet::new();

        let Ok(selector) = Selector::parse("a[href]") else {
            return addresses;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Some(m) = self.onion_pattern.find(href) {
                addresses.insert(format!("http://{}", m.as_str()));
            }
        }

        addresses
    }
}
