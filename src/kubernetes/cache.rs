// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Time-limited cache of client bundles, keyed by cluster context.
//!
//! Lookups share a read lock; insertion on a miss and the background evictor take the
//! write lock briefly. Concurrent misses for one context may both build a bundle, and
//! the last insert wins.
//!
//! Counters are not updated under the entry lock. A miss counted just before a full
//! `invalidate` is wiped by the reset while its bundle is still inserted afterwards.

use super::client::{ClientBundle, ContextKey, ConnectionProvider, KubeconfigProvider};
use crate::config::Config;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// Snapshot of cache counters. The hit rate is informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    pub size: usize,
    /// Percentage of lookups served from the cache
    pub hit_rate: f64,
    pub ttl_ms: u64,
    pub cleanup_interval_ms: u64,
    pub enabled: bool,
}

struct Inner<P> {
    provider: P,
    entries: RwLock<HashMap<ContextKey, Arc<ClientBundle>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    ttl: Duration,
    cleanup_interval: Duration,
    enabled: bool,
    api_timeout: Duration,
}

impl<P> Inner<P> {
    async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, bundle| !bundle.is_expired(self.ttl));
        before - entries.len()
    }
}

/// Cache of [`ClientBundle`]s. Cloning shares the same entries and counters.
pub struct ClientCache<P = KubeconfigProvider> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for ClientCache<P> {
    fn clone(&self) -> Self {
        ClientCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: ConnectionProvider> ClientCache<P> {
    pub fn new(provider: P, config: &Config) -> Self {
        ClientCache {
            inner: Arc::new(Inner {
                provider,
                entries: RwLock::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                ttl: config.cache_ttl,
                cleanup_interval: config.cleanup_interval,
                enabled: config.cache_enabled,
                api_timeout: config.api_timeout,
            }),
        }
    }

    /// Bundle for `context`, reused while younger than the TTL.
    ///
    /// Build failures are returned to the caller and never stored.
    #[instrument(skip(self, context), fields(context = %ContextKey::from(context)))]
    pub async fn get_bundle(&self, context: Option<&str>) -> Result<Arc<ClientBundle>> {
        let key = ContextKey::from(context);
        let inner = &self.inner;

        if inner.enabled {
            let entries = inner.entries.read().await;
            if let Some(bundle) = entries.get(&key).filter(|b| !b.is_expired(inner.ttl)) {
                inner.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(bundle));
            }
        }

        inner.misses.fetch_add(1, Ordering::Relaxed);
        let connection = inner.provider.connect(&key).await.map_err(|e| {
            warn!(error = %e, "Failed to build client bundle");
            e
        })?;
        let bundle = Arc::new(ClientBundle::new(key.clone(), connection, inner.api_timeout));

        if inner.enabled {
            let mut entries = inner.entries.write().await;
            entries.insert(key, Arc::clone(&bundle));
            debug!(server = %bundle.server(), size = entries.len(), "Cached client bundle");
        }

        Ok(bundle)
    }

    /// Drop one context's bundle; with `None` clear everything and reset the counters.
    pub async fn invalidate(&self, context: Option<&str>) {
        let mut entries = self.inner.entries.write().await;
        match context {
            Some(name) => {
                let key = ContextKey::from(Some(name));
                if entries.remove(&key).is_some() {
                    info!(context = %key, "Invalidated client bundle");
                }
            }
            None => {
                entries.clear();
                self.inner.hits.store(0, Ordering::Relaxed);
                self.inner.misses.store(0, Ordering::Relaxed);
                info!("Cleared client bundle cache");
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let size = self.inner.entries.read().await.len();
        let hits = self.inner.hits.load(Ordering::Relaxed);
        let misses = self.inner.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            total,
            size,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 * 100.0 / total as f64
            },
            ttl_ms: self.inner.ttl.as_millis() as u64,
            cleanup_interval_ms: self.inner.cleanup_interval.as_millis() as u64,
            enabled: self.inner.enabled,
        }
    }

    /// Remove every expired bundle now. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        self.inner.evict_expired().await
    }

    /// Start the periodic evictor. It stops when the returned task or the last cache clone is dropped.
    pub fn start_eviction(&self) -> EvictionTask {
        let weak: Weak<Inner<P>> = Arc::downgrade(&self.inner);
        // interval() panics on a zero period
        let period = self.inner.cleanup_interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!("Client cache dropped, stopping evictor");
                    break;
                };
                let removed = inner.evict_expired().await;
                if removed > 0 {
                    let size = inner.entries.read().await.len();
                    info!(removed, size, "Evicted expired client bundles");
                }
            }
        });

        EvictionTask { handle }
    }
}

/// Handle of the background evictor; aborts it on drop.
#[derive(Debug)]
pub struct EvictionTask {
    handle: JoinHandle<()>,
}

impl EvictionTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for EvictionTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
