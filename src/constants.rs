// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Client bundle cache defaults
pub mod cache {
    /// Bundles older than this are never served (5 minutes, well inside EKS token lifetime)
    pub const TTL_MS: u64 = 5 * 60 * 1000;
    /// How often the evictor sweeps expired bundles
    pub const CLEANUP_INTERVAL_MS: u64 = 60 * 1000;
    /// Display name of the current-context cache key
    pub const DEFAULT_CONTEXT_KEY: &str = "default";
}

pub mod defaults {
    pub const API_TIMEOUT_MS: u64 = 30 * 1000;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const NAMESPACE: &str = "default";
    pub const EVENTS_WINDOW_HOURS: u64 = 24;
    /// Log lines returned when no tail is requested
    pub const LOG_TAIL_LINES: i64 = 100;
}

/// Environment variable names read by `Config::from_env`
pub mod env {
    pub const CACHE_TTL_MS: &str = "K8S_CLIENT_CACHE_TTL_MS";
    pub const CACHE_CLEANUP_INTERVAL_MS: &str = "K8S_CLIENT_CACHE_CLEANUP_INTERVAL_MS";
    pub const CACHE_ENABLED: &str = "ENABLE_K8S_CLIENT_CACHE";
    pub const API_TIMEOUT_MS: &str = "K8S_API_TIMEOUT_MS";
    pub const NAMESPACE: &str = "KUBEDECK_NAMESPACE";
    pub const CONTEXT: &str = "KUBEDECK_CONTEXT";
    pub const SELECTOR: &str = "KUBEDECK_SELECTOR";
    pub const EVENTS_WINDOW_HOURS: &str = "KUBEDECK_EVENTS_WINDOW_HOURS";
}

/// Label prefix marking node roles
pub const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";
