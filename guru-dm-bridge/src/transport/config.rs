//! HTTP transport settings, read from the `[http]` table of the bridge
//! configuration.

use std::{ops::RangeInclusive, time::Duration};

use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// Idle connections kept per host when not configured.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;
/// Request timeout when not configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Connect timeout when not configured.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// `User-Agent` sent when not configured.
pub const DEFAULT_USER_AGENT: &str = concat!("guru-dm-bridge/", env!("CARGO_PKG_VERSION"));

const TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;
const CONNECT_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=60;

/// `[http]` settings.
///
/// Every key is optional:
///
/// ```toml
/// [http]
/// timeout_secs = 30
/// connect_timeout_secs = 10
/// pool_max_idle_per_host = 10
/// http_version = "auto"              # "http1" | "http2" | "auto"
/// user_agent = "acme-automation/1.4"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Idle connections kept open per host.
    pub pool_max_idle_per_host: usize,
    /// Whole-request timeout in seconds, `1..=300`.
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds, `1..=60`.
    pub connect_timeout_secs: u64,
    /// Protocol selection.
    pub http_version: HttpVersion,
    /// `User-Agent` header; defaults to `guru-dm-bridge/<version>`.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            http_version: HttpVersion::Auto,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Checks timeouts against their allowed ranges and rejects a blank or
    /// multi-line user agent.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        check_range("http.timeout_secs", self.timeout_secs, &TIMEOUT_RANGE)?;
        check_range(
            "http.connect_timeout_secs",
            self.connect_timeout_secs,
            &CONNECT_TIMEOUT_RANGE,
        )?;

        if let Some(agent) = &self.user_agent
            && (agent.trim().is_empty() || agent.chars().any(char::is_control))
        {
            return Err(BridgeError::ConfigError(
                "http.user_agent must be non-empty printable text".to_owned(),
            ));
        }

        Ok(())
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Effective `User-Agent`.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

fn check_range(key: &str, value: u64, range: &RangeInclusive<u64>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(BridgeError::ConfigError(format!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Protocol selection for the HTTP client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 with prior knowledge.
    Http2,
    /// Negotiated via ALPN.
    #[default]
    Auto,
}
