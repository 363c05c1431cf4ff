// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{cache, defaults, env as keys};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Data-access configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// How long a cached client bundle may be served
    pub cache_ttl: Duration,
    /// Period of the background sweep removing expired bundles
    pub cleanup_interval: Duration,
    /// When false, every lookup builds a fresh bundle and nothing is stored
    pub cache_enabled: bool,
    /// Upper bound for a single upstream API call
    pub api_timeout: Duration,
    pub namespace: String,
    /// Context to query; `None` selects the current kubeconfig context
    pub context: Option<String>,
    pub selector: Option<String>,
    pub events_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_ttl: Duration::from_millis(cache::TTL_MS),
            cleanup_interval: Duration::from_millis(cache::CLEANUP_INTERVAL_MS),
            cache_enabled: true,
            api_timeout: Duration::from_millis(defaults::API_TIMEOUT_MS),
            namespace: defaults::NAMESPACE.to_string(),
            context: None,
            selector: None,
            events_window: Duration::from_secs(defaults::EVENTS_WINDOW_HOURS * 3600),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base = Config::default();

        let cache_ttl = millis_var(keys::CACHE_TTL_MS)?.unwrap_or(base.cache_ttl);
        let cleanup_interval =
            millis_var(keys::CACHE_CLEANUP_INTERVAL_MS)?.unwrap_or(base.cleanup_interval);
        let api_timeout = millis_var(keys::API_TIMEOUT_MS)?.unwrap_or(base.api_timeout);
        // Anything but an explicit "false" keeps the cache on
        let cache_enabled = env::var(keys::CACHE_ENABLED).map_or(true, |v| v != "false");

        let namespace = non_empty_var(keys::NAMESPACE).unwrap_or(base.namespace);
        let context = non_empty_var(keys::CONTEXT);
        let selector = non_empty_var(keys::SELECTOR);

        let events_window = match non_empty_var(keys::EVENTS_WINDOW_HOURS) {
            Some(raw) => {
                let hours: u64 = raw.parse().with_context(|| {
                    format!("{} must be a whole number of hours, got '{}'", keys::EVENTS_WINDOW_HOURS, raw)
                })?;
                Duration::from_secs(hours * 3600)
            }
            None => base.events_window,
        };

        Ok(Config {
            cache_ttl,
            cleanup_interval,
            cache_enabled,
            api_timeout,
            namespace,
            context,
            selector,
            events_window,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn millis_var(key: &str) -> Result<Option<Duration>> {
    non_empty_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{} must be a number of milliseconds, got '{}'", key, raw))
        })
        .transpose()
}
