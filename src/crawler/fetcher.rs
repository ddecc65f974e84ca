//! HTTP fetcher for the main crawl pass
//!
//! Issues the actual crawl GET with a shorter timeout than the validation
//! probe, and branches binary archive payloads into the quarantine
//! directory so they never reach the keyword matcher.

use crate::config::NetworkConfig;
use reqwest::{redirect::Policy, Client, Proxy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Content-type fragments and URL suffixes that route to quarantine
const BINARY_MARKERS: &[&str] = &["zip", "sql"];

/// Fallback file name when the URL has no usable basename
const QUARANTINE_FALLBACK_NAME: &str = "payload.bin";

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Textual 200 response; the decoded body goes to the matcher
    Text {
        /// Decoded response body
        body: String,
    },

    /// Binary payload written unmodified to the quarantine directory
    ///
    /// Counts as "no text content": quarantined bytes never reach the
    /// matcher, and the seed takes the failure path.
    BinaryQuarantined {
        /// Where the payload was written
        path: PathBuf,
    },

    /// No content obtained (non-200, transport error, body decode error)
    NoContent {
        /// Why the fetch yielded nothing, for the log
        reason: String,
    },
}

/// Builds the shared HTTP client
///
/// One client per process: every outbound request (probe and fetch) goes
/// through the same SOCKS proxy and carries the same User-Agent. Timeouts
/// are per-request, since the probe and the crawl pass use different ones.
pub fn build_http_client(network: &NetworkConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(network.user_agent.clone())
        .proxy(Proxy::all(&network.socks_proxy)?)
        .redirect(Policy::limited(5))
        .build()
}

/// Fetches crawl content for addresses already known to be worth fetching
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    quarantine_dir: PathBuf,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration, quarantine_dir: &Path) -> Self {
        Self {
            client,
            timeout,
            quarantine_dir: quarantine_dir.to_path_buf(),
        }
    }

    /// Fetches one address and classifies the payload
    ///
    /// Never propagates a transport error; every failure mode becomes
    /// [`FetchOutcome::NoContent`].
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        tracing::info!("Fetching: {}", url);

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                let reason = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                tracing::warn!("Fetch failed for {}: {}", url, reason);
                return FetchOutcome::NoContent { reason };
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetch failed for {}: HTTP {}", url, status.as_u16());
            return FetchOutcome::NoContent {
                reason: format!("HTTP {}", status.as_u16()),
            };
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if is_binary_payload(url, &content_type) {
            return self.quarantine(url, response).await;
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Text { body },
            Err(e) => {
                tracing::warn!("Failed to decode body for {}: {}", url, e);
                FetchOutcome::NoContent {
                    reason: format!("body decode error: {}", e),
                }
            }
        }
    }

    /// Writes the entire byte payload unmodified to the quarantine dir
    async fn quarantine(&self, url: &str, response: reqwest::Response) -> FetchOutcome {
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read binary payload for {}: {}", url, e);
                return FetchOutcome::NoContent {
                    reason: format!("binary read error: {}", e),
                };
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.quarantine_dir).await {
            tracing::error!("Cannot create quarantine dir: {}", e);
            return FetchOutcome::NoContent {
                reason: format!("quarantine dir error: {}", e),
            };
        }

        let path = self.quarantine_dir.join(quarantine_file_name(url));
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                tracing::warn!(
                    "Quarantined {} bytes from {} to {}",
                    bytes.len(),
                    url,
                    path.display()
                );
                FetchOutcome::BinaryQuarantined { path }
            }
            Err(e) => {
                tracing::error!("Failed to write quarantine file: {}", e);
                FetchOutcome::NoContent {
                    reason: format!("quarantine write error: {}", e),
                }
            }
        }
    }
}

/// Decides whether a response routes to quarantine
///
/// Matches on the declared content type or the URL suffix.
fn is_binary_payload(url: &str, content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    let path = url.split('?').next().unwrap_or(url).to_lowercase();
    BINARY_MARKERS
        .iter()
        .any(|m| ct.contains(m) || path.ends_with(&format!(".{}", m)))
}

/// Derives the quarantine file name from the URL's final path segment,
/// falling back to a generic name when the path has no basename
fn quarantine_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| QUARANTINE_FALLBACK_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher(dir: &TempDir) -> Fetcher {
        Fetcher::new(Client::new(), Duration::from_secs(5), dir.path())
    }

    #[test]
    fn test_binary_detection() {
        assert!(is_binary_payload("http://x/dump.zip", ""));
        assert!(is_binary_payload("http://x/backup.sql", ""));
        assert!(is_binary_payload("http://x/page", "application/zip"));
        assert!(is_binary_payload("http://x/page", "application/sql"));
        assert!(!is_binary_payload("http://x/page", "text/html"));
        assert!(!is_binary_payload("http://x/", "text/plain; charset=utf-8"));
    }

    #[test]
    fn test_quarantine_file_name() {
        assert_eq!(quarantine_file_name("http://x.onion/dump.zip"), "dump.zip");
        assert_eq!(
            quarantine_file_name("http://x.onion/a/b/leak.sql?x=1"),
            "leak.sql"
        );
        assert_eq!(quarantine_file_name("http://x.onion/"), "payload.bin");
        assert_eq!(quarantine_file_name("http://x.onion"), "payload.bin");
        assert_eq!(quarantine_file_name("not a url"), "payload.bin");
    }

    #[tokio::test]
    async fn test_fetch_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>hello</html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let outcome = test_fetcher(&dir).fetch(&format!("{}/", server.uri())).await;

        match outcome {
            FetchOutcome::Text { body } => assert_eq!(body, "<html>hello</html>"),
            other => panic!("expected Text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_binary_payload_quarantined_byte_for_byte() {
        let payload: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0xff, 0x00, 0x7f];

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dump.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(payload.clone())
                    .insert_header("content-type", "application/zip"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/dump.zip", server.uri());
        let outcome = test_fetcher(&dir).fetch(&url).await;

        match outcome {
            FetchOutcome::BinaryQuarantined { path } => {
                assert_eq!(path.file_name().unwrap(), "dump.zip");
                let written = std::fs::read(&path).unwrap();
                assert_eq!(written, payload);
            }
            other => panic!("expected BinaryQuarantined, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_200_is_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let outcome = test_fetcher(&dir)
            .fetch(&format!("{}/gone", server.uri()))
            .await;

        match outcome {
            FetchOutcome::NoContent { reason } => assert_eq!(reason, "HTTP 404"),
            other => panic!("expected NoContent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_no_content() {
        let dir = TempDir::new().unwrap();
        // Port 1 is effectively never listening
        let outcome = test_fetcher(&dir).fetch("http://127.0.0.1:1/").await;
        assert!(matches!(outcome, FetchOutcome::NoContent { .. }));
    }
}
