//! Configuration for the pool stats exporter.
//!
//! Upstream settings are resolved from the process environment on every
//! scrape rather than cached at startup, so a redeployed pool fleet is
//! picked up without restarting the exporter.

use std::env;

use thiserror::Error;

/// Environment variable naming the upstream pool hosts.
pub const ENV_DIAL_ADDR: &str = "CPOOL_DIAL_ADDR";
/// Environment variable overriding the stats port.
pub const ENV_PORT: &str = "CPOOL_PORT";
/// Environment variable overriding the transport protocol label.
pub const ENV_PROTO: &str = "CPOOL_PROTO";
/// Environment variable overriding the stats method label.
pub const ENV_STATS: &str = "CPOOL_STATS";
/// Environment variable overriding the per-fetch deadline.
pub const ENV_TIMEOUT_SECS: &str = "CPOOL_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CPOOL_DIAL_ADDR must be set, e.g. CPOOL_DIAL_ADDR=192.168.1.1;192.168.1.2")]
    MissingAddresses,
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Upstream pool configuration, resolved fresh on every scrape.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upstream pool daemon hosts, visited in this order.
    pub dial_addrs: Vec<String>,
    /// Stats port shared by all upstreams (default: `8117`).
    pub port: String,
    /// Transport protocol label (informational; default: `tcp`).
    pub proto: String,
    /// Stats method label (informational; the wire path is fixed to
    /// `/stats`; default: `stats`).
    pub stats_method: String,
    /// Per-fetch deadline in seconds (default: `10`).
    pub timeout_secs: u64,
}

fn default_port() -> String {
    "8117".to_string()
}

fn default_proto() -> String {
    "tcp".to_string()
}

fn default_stats_method() -> String {
    "stats".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl PoolConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Resolve configuration through a key lookup.
    ///
    /// Unset or empty optional values fall back to their defaults. The
    /// address list is required: absent, empty, or whitespace-only entries
    /// leave nothing to scrape.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dial_addrs: Vec<String> = lookup(ENV_DIAL_ADDR)
            .unwrap_or_default()
            .split(';')
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .collect();

        if dial_addrs.is_empty() {
            return Err(ConfigError::MissingAddresses);
        }

        let port = non_empty(lookup(ENV_PORT)).unwrap_or_else(default_port);
        let proto = non_empty(lookup(ENV_PROTO)).unwrap_or_else(default_proto);
        let stats_method = non_empty(lookup(ENV_STATS)).unwrap_or_else(default_stats_method);

        let timeout_secs = match non_empty(lookup(ENV_TIMEOUT_SECS)) {
            Some(raw) => raw.parse().map_err(|_| {
                ConfigError::Validation(format!("Invalid {}: {}", ENV_TIMEOUT_SECS, raw))
            })?,
            None => default_timeout_secs(),
        };

        let config = Self {
            dial_addrs,
            port,
            proto,
            stats_method,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.parse::<u16>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid port: {}",
                self.port
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
