//! Transport settings for the request executor.
//!
//! The core enforces no timeout of its own. Hosts that need bounded latency
//! set one here; otherwise the transport default applies.

use std::time::Duration;

pub const TIMEOUT_ENV: &str = "HTTP_ACTION_TIMEOUT_MS";
pub const MAX_BODY_ENV: &str = "HTTP_ACTION_MAX_BODY_BYTES";

/// Responses are read fully into memory, so bodies above this are refused.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Overall deadline for one request, connect through body read.
    pub timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ExecutorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparsable values are ignored in favor of the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = parse_var(&lookup, TIMEOUT_ENV) {
            config.timeout = Some(Duration::from_millis(ms));
        }
        if let Some(bytes) = parse_var(&lookup, MAX_BODY_ENV) {
            config.max_body_bytes = bytes;
        }
        config
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "ignoring invalid setting");
            None
        }
    }
}
