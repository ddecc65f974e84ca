use serde::Deserialize;

/// Main configuration structure for onionwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub monitor: MonitorConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,

    /// Keywords to scan fetched pages for
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Anonymizing-network endpoints and request identity
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// SOCKS proxy URL used for every outbound request
    #[serde(rename = "socks-proxy")]
    pub socks_proxy: String,

    /// Control channel address (host:port), used only for bootstrap
    /// checks and identity rotation
    #[serde(rename = "control-addr")]
    pub control_addr: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; rv:102.0) Gecko/20100101 Firefox/102.0".to_string()
}

/// Monitor timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Timeout for the validation probe (seconds). Onion routing is slow;
    /// anything past this is effectively dead for scraping.
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for the main crawl fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Unconditional delay between seeds (milliseconds), the sole
    /// back-pressure mechanism toward the network
    #[serde(rename = "politeness-delay-ms", default = "default_politeness")]
    pub politeness_delay_ms: u64,

    /// Request a new circuit between runs
    #[serde(rename = "rotate-identity-between-runs", default)]
    pub rotate_identity_between_runs: bool,
}

fn default_probe_timeout() -> u64 {
    45
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_politeness() -> u64 {
    2000
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory for quarantined binary payloads
    #[serde(rename = "quarantine-dir")]
    pub quarantine_dir: String,
}

/// Seed discovery configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeedingConfig {
    /// Directory/index pages to scrape for candidate addresses
    #[serde(default)]
    pub sources: Vec<String>,

    /// Manually supplied seed addresses
    #[serde(default)]
    pub seeds: Vec<String>,
}
