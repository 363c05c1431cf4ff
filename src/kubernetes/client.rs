// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client bundles and the kubeconfig-backed connection provider

use crate::constants::{cache, defaults};
use crate::error::{DeckError, Result};
use k8s_openapi::NamespaceResourceScope;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config as KConfig, Resource};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Cache key of a cluster context. An absent or empty context name selects the current context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextKey {
    Current,
    Named(String),
}

impl ContextKey {
    pub fn name(&self) -> Option<&str> {
        match self {
            ContextKey::Current => None,
            ContextKey::Named(name) => Some(name),
        }
    }
}

impl From<Option<&str>> for ContextKey {
    fn from(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => ContextKey::Named(name.to_string()),
            _ => ContextKey::Current,
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKey::Current => f.write_str(cache::DEFAULT_CONTEXT_KEY),
            ContextKey::Named(name) => f.write_str(name),
        }
    }
}

/// A ready client and the server endpoint it talks to.
pub struct Connection {
    pub client: Client,
    pub server: String,
}

/// Resolves a context into a connection. Failures must not leak credentials into the error.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connect(&self, context: &ContextKey) -> impl Future<Output = Result<Connection>> + Send;
}

/// Everything needed to query one cluster context.
///
/// A single [`Client`] multiplexes every API group, so each group handle is a typed
/// [`Api`] view over the same client.
pub struct ClientBundle {
    context: ContextKey,
    client: Client,
    server: String,
    created_at: Instant,
    api_timeout: Duration,
}

impl ClientBundle {
    pub fn new(context: ContextKey, connection: Connection, api_timeout: Duration) -> Self {
        ClientBundle {
            context,
            client: connection.client,
            server: connection.server,
            created_at: Instant::now(),
            api_timeout,
        }
    }

    pub fn context(&self) -> &ContextKey {
        &self.context
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Upper bound applied to each API call made through this bundle
    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// A bundle is served only while younger than `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    pub fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Handle for cluster-scoped kinds, or namespaced kinds across all namespaces
    pub fn all<K>(&self) -> Api<K>
    where
        K: Resource,
        <K as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }
}

impl fmt::Debug for ClientBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBundle")
            .field("context", &self.context)
            .field("server", &self.server)
            .field("age", &self.age())
            .finish_non_exhaustive()
    }
}

enum KubeconfigSource {
    /// `$KUBECONFIG` or `~/.kube/config`, read again on every connect
    Default,
    Inline(Box<Kubeconfig>),
}

/// Builds clients from kubeconfig contexts.
///
/// The current context falls back to in-cluster configuration when no kubeconfig exists.
pub struct KubeconfigProvider {
    source: KubeconfigSource,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl KubeconfigProvider {
    pub fn new(api_timeout: Duration) -> Self {
        KubeconfigProvider {
            source: KubeconfigSource::Default,
            connect_timeout: Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS),
            read_timeout: api_timeout,
        }
    }

    /// Provider over an in-memory kubeconfig document
    pub fn from_yaml(kubeconfig: &str, api_timeout: Duration) -> Result<Self> {
        let parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
            .map_err(|e| DeckError::configuration(cache::DEFAULT_CONTEXT_KEY, format!("invalid kubeconfig: {}", e)))?;
        Ok(KubeconfigProvider {
            source: KubeconfigSource::Inline(Box::new(parsed)),
            ..Self::new(api_timeout)
        })
    }

    /// Resolve the client configuration of `context`, with timeouts applied.
    pub async fn resolve(&self, context: &ContextKey) -> Result<KConfig> {
        let options = KubeConfigOptions {
            context: context.name().map(str::to_string),
            ..Default::default()
        };

        let mut config = match (&self.source, context) {
            (KubeconfigSource::Inline(kubeconfig), _) => {
                KConfig::from_custom_kubeconfig((**kubeconfig).clone(), &options)
                    .await
                    .map_err(|e| DeckError::configuration(context.to_string(), e))?
            }
            (KubeconfigSource::Default, ContextKey::Current) => KConfig::infer()
                .await
                .map_err(|e| DeckError::configuration(context.to_string(), e))?,
            (KubeconfigSource::Default, ContextKey::Named(_)) => {
                let kubeconfig =
                    Kubeconfig::read().map_err(|e| DeckError::configuration(context.to_string(), e))?;
                KConfig::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| DeckError::configuration(context.to_string(), e))?
            }
        };

        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);
        Ok(config)
    }
}

impl ConnectionProvider for KubeconfigProvider {
    #[instrument(skip(self), fields(context = %context))]
    async fn connect(&self, context: &ContextKey) -> Result<Connection> {
        let config = self.resolve(context).await?;
        let server = server_endpoint(context, &config)?;

        let client = Client::try_from(config)
            .map_err(|e| DeckError::configuration(context.to_string(), format!("cannot build client: {}", e)))?;
        debug!(server = %server, "Built cluster client");

        Ok(Connection { client, server })
    }
}

/// The server endpoint of a resolved configuration; a missing host is a configuration error.
pub fn server_endpoint(context: &ContextKey, config: &KConfig) -> Result<String> {
    match config.cluster_url.host() {
        Some(host) if !host.is_empty() => Ok(config.cluster_url.to_string()),
        _ => Err(DeckError::configuration(
            context.to_string(),
            "cluster has no server endpoint",
        )),
    }
}
