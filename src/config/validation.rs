use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Checks that the proxy endpoint is a SOCKS URL, that timeouts are
/// non-zero, that output paths are set, and that at least one keyword is
/// configured (a monitor with nothing to look for is a misconfiguration).
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_proxy(&config.network.socks_proxy)?;
    validate_control_addr(&config.network.control_addr)?;

    if config.monitor.probe_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "probe-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.monitor.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.output.quarantine_dir.is_empty() {
        return Err(ConfigError::Validation(
            "quarantine-dir must not be empty".to_string(),
        ));
    }

    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "at least one keyword must be configured".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keywords must not be empty strings".to_string(),
        ));
    }

    Ok(())
}

fn validate_proxy(proxy: &str) -> Result<(), ConfigError> {
    if !proxy.starts_with("socks5://") && !proxy.starts_with("socks5h://") {
        return Err(ConfigError::Validation(format!(
            "socks-proxy must be a socks5:// or socks5h:// URL, got: {}",
            proxy
        )));
    }
    Ok(())
}

fn validate_control_addr(addr: &str) -> Result<(), ConfigError> {
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "control-addr must be host:port, got: {}",
            addr
        ))),
    }
}
