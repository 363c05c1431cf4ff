// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster access: client bundles, the bundle cache and normalized upstream reads.

pub mod cache;
pub mod client;
pub mod resources;

pub use cache::{CacheStats, ClientCache, EvictionTask};
pub use client::{ClientBundle, Connection, ConnectionProvider, ContextKey, KubeconfigProvider};
pub use resources::{
    check_connection, fetch_events, fetch_node_events, fetch_node_pods, fetch_pod_logs,
    fetch_resource_events, fetch_resources_with_labels, get_resource, list_resources,
    ClusterEvent, LabelScan, LogOptions,
};
