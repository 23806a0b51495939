//! Service Configuration
//!
//! Read from `TU_TRU_*` environment variables (after `.env` is loaded by the
//! binary). Unset variables fall back to defaults; malformed numbers are errors.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to
    pub addr: String,
    /// Maximum request body size in bytes
    pub body_limit: usize,
    /// Requests allowed per client per window
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub cache_capacity: usize,
    /// External delegate, `None` when `TU_TRU_DELEGATE_URL` is unset
    pub delegate: Option<DelegateConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            body_limit: 16 * 1024,
            rate_limit: 30,
            rate_window: Duration::from_secs(60),
            cache_capacity: 1024,
            delegate: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let retry_defaults = RetryPolicy::default();

        let delegate = match lookup("TU_TRU_DELEGATE_URL").filter(|u| !u.trim().is_empty()) {
            Some(url) => Some(DelegateConfig {
                url,
                api_key: lookup("TU_TRU_DELEGATE_KEY").filter(|k| !k.is_empty()),
                retry: RetryPolicy {
                    max_attempts: parse_var(&lookup, "TU_TRU_DELEGATE_RETRIES")?
                        .unwrap_or(retry_defaults.max_attempts),
                    attempt_timeout: parse_var(&lookup, "TU_TRU_DELEGATE_TIMEOUT_MS")?
                        .map(Duration::from_millis)
                        .unwrap_or(retry_defaults.attempt_timeout),
                    base_delay: parse_var(&lookup, "TU_TRU_DELEGATE_BACKOFF_MS")?
                        .map(Duration::from_millis)
                        .unwrap_or(retry_defaults.base_delay),
                },
            }),
            None => None,
        };

        Ok(Self {
            addr: lookup("TU_TRU_ADDR").unwrap_or(defaults.addr),
            body_limit: parse_var(&lookup, "TU_TRU_BODY_LIMIT")?.unwrap_or(defaults.body_limit),
            rate_limit: parse_var(&lookup, "TU_TRU_RATE_LIMIT")?.unwrap_or(defaults.rate_limit),
            rate_window: parse_var(&lookup, "TU_TRU_RATE_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_window),
            cache_capacity: parse_var(&lookup, "TU_TRU_CACHE_CAPACITY")?.unwrap_or(defaults.cache_capacity),
            delegate,
        })
    }
}

/// Parse an optional numeric variable into its target type. Unset or blank
/// means `None`; anything unparseable or out of range for `T` is an error.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map(Some).with_context(|| {
            format!(
                "{} must be a non-negative integer that fits in {}, got {:?}",
                key,
                std::any::type_name::<T>(),
                raw
            )
        }),
        _ => Ok(None),
    }
}
