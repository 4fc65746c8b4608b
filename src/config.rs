//! Embedder configuration.
//!
//! The reactor itself owns no configuration file; this module is the
//! conventional TOML layer for programs built on it.
//!
//! ```toml
//! [server]
//! address = "0.0.0.0"
//! port = 9180
//! max_fds = 65536
//! idle_timeout_ms = 1000
//! read_buffer_size = "64KB"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use crate::endpoint::{Endpoint, Family};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and event loop settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, an IPv4 or IPv6 literal.
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to bind (1-65535).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen backlog; OS maximum when absent.
    pub backlog: Option<u32>,

    /// RLIMIT_NOFILE to request at startup.
    #[serde(default = "default_max_fds")]
    pub max_fds: u64,

    /// Upper bound on a single poller wait, in milliseconds. Zero means
    /// block until readiness.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Read-drain buffer size (e.g. "64KB").
    #[serde(
        default = "default_read_buffer_size",
        deserialize_with = "deserialize_size"
    )]
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            backlog: None,
            max_fds: default_max_fds(),
            idle_timeout_ms: default_idle_timeout_ms(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl ServerConfig {
    /// The configured listener endpoint.
    pub fn endpoint(&self) -> Result<Endpoint, Box<dyn std::error::Error>> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", self.address, e))?;
        let family = if ip.is_ipv4() { Family::V4 } else { Family::V6 };
        Ok(Endpoint::new(family, self.address.clone(), self.port as u32)?)
    }

    /// The idle timeout as the reactor expects it.
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.idle_timeout_ms))
        }
    }
}

/// Logging settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps in output.
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Include the event's module path.
    #[serde(default)]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            timestamps: true,
            target: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

// Default value functions

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9180
}

fn default_max_fds() -> u64 {
    65536
}

fn default_idle_timeout_ms() -> u64 {
    1000
}

fn default_read_buffer_size() -> usize {
    64 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Deserialize a size given as a number or a string like "64KB".
fn deserialize_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Number(usize),
        String(String),
    }

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Number(n) => Ok(n),
        SizeValue::String(s) => parse_size(&s).map_err(D::Error::custom),
    }
}

/// Parse a size string like "64KB" or "4MB" into bytes.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| c.is_alphabetic()) {
        Some(idx) => (&s[..idx], s[idx..].to_uppercase()),
        None => (s, String::new()),
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let multiplier: usize = match suffix.as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        _ => return Err(format!("unknown size suffix: {}", suffix)),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| "size overflow".to_string())
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.server.endpoint()?;

        if self.server.read_buffer_size == 0 {
            return Err("read_buffer_size must be non-zero".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("64KB").unwrap(), 64 * 1024);
        assert_eq!(parse_size("4MB").unwrap(), 4 * 1024 * 1024);
        assert!(parse_size("").is_err());
        assert!(parse_size("12XB").is_err());
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.server.port, 9180);
        assert_eq!(config.server.read_buffer_size, 64 * 1024);
        assert_eq!(config.server.idle_timeout(), Some(Duration::from_millis(1000)));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        config.validate().unwrap();
    }

    #[test]
    fn test_full_parse() {
        let config: Config = toml::from_str(
            r#"
            [server]
            address = "127.0.0.1"
            port = 18080
            backlog = 512
            idle_timeout_ms = 0
            read_buffer_size = "16KB"

            [logging]
            level = "debug"
            format = "json"
            timestamps = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 18080);
        assert_eq!(config.server.backlog, Some(512));
        assert_eq!(config.server.idle_timeout(), None);
        assert_eq!(config.server.read_buffer_size, 16 * 1024);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.logging.timestamps);

        let ep = config.server.endpoint().unwrap();
        assert_eq!(ep.address(), "127.0.0.1");
        assert_eq!(ep.port(), 18080);
    }

    #[test]
    fn test_invalid_address_rejected() {
        let config: Config = toml::from_str(
            r#"
            [server]
            address = "example.com"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let parsed: Result<Config, _> = toml::from_str(
            r#"
            [server]
            addr = "127.0.0.1"
            "#,
        );
        assert!(parsed.is_err());
    }
}
