// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use kubedeck::config::Config;
use kubedeck::kubernetes::{fetch_resources_with_labels, ClientCache, KubeconfigProvider};
use kubedeck::labels::browse_labels;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!(
        namespace = %config.namespace,
        context = config.context.as_deref().unwrap_or("default"),
        cache_enabled = config.cache_enabled,
        "Configuration loaded"
    );

    let cache = ClientCache::new(KubeconfigProvider::new(config.api_timeout), &config);
    let _evictor = cache.start_eviction();

    let bundle = cache
        .get_bundle(config.context.as_deref())
        .await
        .context("Failed to connect to cluster")?;
    info!(server = %bundle.server(), "Connected to Kubernetes cluster");

    let scan = fetch_resources_with_labels(&bundle, &config.namespace).await;
    for (kind, reason) in &scan.failed_kinds {
        warn!(kind = %kind, reason = %reason, "Kind skipped");
    }

    let selector = config.selector.as_deref().unwrap_or("");
    let result = browse_labels(scan.resources, selector)
        .with_context(|| format!("Invalid selector '{}'", selector))?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    let stats = cache.stats().await;
    debug!(
        hits = stats.hits,
        misses = stats.misses,
        size = stats.size,
        hit_rate = %format!("{:.2}%", stats.hit_rate),
        "Client cache stats"
    );
    Ok(())
}
