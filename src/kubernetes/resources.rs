// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Upstream reads through a client bundle, normalized on the way out.
//!
//! Every call is bounded by the bundle's API timeout. A forbidden list is treated as an
//! empty result so that one restricted kind does not hide the others.

use super::client::ClientBundle;
use crate::constants::defaults;
use crate::error::{DeckError, Result};
use crate::normalize::{Normalize, Normalizer};
use crate::types::{DomainResource, ResourceKind};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, Event, LimitRange, Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod,
    ResourceQuota, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{ListParams, LogParams};
use kube::{Api, Resource};
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Await an API call under the bundle's timeout.
async fn bounded<T>(
    bundle: &ClientBundle,
    what: &str,
    call: impl Future<Output = kube::Result<T>>,
) -> Result<kube::Result<T>> {
    tokio::time::timeout(bundle.api_timeout(), call)
        .await
        .map_err(|_| DeckError::UpstreamUnavailable {
            context: bundle.context().to_string(),
            reason: format!("{} timed out after {:?}", what, bundle.api_timeout()),
        })
}

async fn list_with<K>(
    bundle: &ClientBundle,
    api: Api<K>,
    params: &ListParams,
    namespace: &str,
) -> Result<Vec<DomainResource>>
where
    K: Normalize + Clone + Debug,
{
    let context = bundle.context().to_string();
    let what = format!("listing {} ({})", K::KIND, K::KIND.api_group());

    match bounded(bundle, &what, api.list(params)).await? {
        Ok(list) => {
            let normalizer = Normalizer::new();
            debug!(
                kind = %K::KIND,
                group = %K::KIND.api_group(),
                namespace,
                count = list.items.len(),
                "Listed resources"
            );
            Ok(list
                .items
                .iter()
                .map(|obj| normalizer.resource(obj, namespace))
                .collect())
        }
        Err(e) => match DeckError::from_api(e, &context, K::KIND, namespace) {
            DeckError::PermissionDenied { kind, namespace } => {
                warn!(kind = %kind, namespace = %namespace, "Permission denied, listing as empty");
                Ok(Vec::new())
            }
            other => Err(other),
        },
    }
}

async fn get_with<K>(
    bundle: &ClientBundle,
    api: Api<K>,
    name: &str,
    namespace: &str,
) -> Result<Option<DomainResource>>
where
    K: Normalize + Clone + Debug,
{
    let context = bundle.context().to_string();
    let what = format!("reading {} '{}' ({})", K::KIND, name, K::KIND.api_group());

    match bounded(bundle, &what, api.get_opt(name)).await? {
        Ok(found) => Ok(found.map(|obj| Normalizer::new().resource(&obj, namespace))),
        Err(e) => Err(DeckError::from_api(e, &context, K::KIND, namespace)),
    }
}

async fn list_in<K>(bundle: &ClientBundle, namespace: &str) -> Result<Vec<DomainResource>>
where
    K: Normalize + Resource<Scope = NamespaceResourceScope> + Clone + Debug,
    <K as Resource>::DynamicType: Default,
{
    list_with(bundle, bundle.namespaced::<K>(namespace), &ListParams::default(), namespace).await
}

async fn get_in<K>(bundle: &ClientBundle, name: &str, namespace: &str) -> Result<Option<DomainResource>>
where
    K: Normalize + Resource<Scope = NamespaceResourceScope> + Clone + Debug,
    <K as Resource>::DynamicType: Default,
{
    get_with(bundle, bundle.namespaced::<K>(namespace), name, namespace).await
}

async fn list_cluster<K>(bundle: &ClientBundle) -> Result<Vec<DomainResource>>
where
    K: Normalize + Clone + Debug,
    <K as Resource>::DynamicType: Default,
{
    list_with(bundle, bundle.all::<K>(), &ListParams::default(), "").await
}

/// List one kind in `namespace` (ignored for cluster-scoped kinds) and normalize the items.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn list_resources(
    bundle: &ClientBundle,
    kind: ResourceKind,
    namespace: &str,
) -> Result<Vec<DomainResource>> {
    match kind {
        ResourceKind::Deployment => list_in::<Deployment>(bundle, namespace).await,
        ResourceKind::StatefulSet => list_in::<StatefulSet>(bundle, namespace).await,
        ResourceKind::DaemonSet => list_in::<DaemonSet>(bundle, namespace).await,
        ResourceKind::Pod => list_in::<Pod>(bundle, namespace).await,
        ResourceKind::Service => list_in::<Service>(bundle, namespace).await,
        ResourceKind::ConfigMap => list_in::<ConfigMap>(bundle, namespace).await,
        ResourceKind::Secret => list_in::<Secret>(bundle, namespace).await,
        ResourceKind::Job => list_in::<Job>(bundle, namespace).await,
        ResourceKind::CronJob => list_in::<CronJob>(bundle, namespace).await,
        ResourceKind::Ingress => list_in::<Ingress>(bundle, namespace).await,
        ResourceKind::PersistentVolumeClaim => {
            list_in::<PersistentVolumeClaim>(bundle, namespace).await
        }
        ResourceKind::HorizontalPodAutoscaler => {
            list_in::<HorizontalPodAutoscaler>(bundle, namespace).await
        }
        ResourceKind::ResourceQuota => list_in::<ResourceQuota>(bundle, namespace).await,
        ResourceKind::LimitRange => list_in::<LimitRange>(bundle, namespace).await,
        ResourceKind::PersistentVolume => list_cluster::<PersistentVolume>(bundle).await,
        ResourceKind::Namespace => list_cluster::<Namespace>(bundle).await,
        ResourceKind::Node => list_cluster::<Node>(bundle).await,
    }
}

/// Read a single object. A missing object is `None`; a forbidden read is an error.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn get_resource(
    bundle: &ClientBundle,
    kind: ResourceKind,
    name: &str,
    namespace: &str,
) -> Result<Option<DomainResource>> {
    match kind {
        ResourceKind::Deployment => get_in::<Deployment>(bundle, name, namespace).await,
        ResourceKind::StatefulSet => get_in::<StatefulSet>(bundle, name, namespace).await,
        ResourceKind::DaemonSet => get_in::<DaemonSet>(bundle, name, namespace).await,
        ResourceKind::Pod => get_in::<Pod>(bundle, name, namespace).await,
        ResourceKind::Service => get_in::<Service>(bundle, name, namespace).await,
        ResourceKind::ConfigMap => get_in::<ConfigMap>(bundle, name, namespace).await,
        ResourceKind::Secret => get_in::<Secret>(bundle, name, namespace).await,
        ResourceKind::Job => get_in::<Job>(bundle, name, namespace).await,
        ResourceKind::CronJob => get_in::<CronJob>(bundle, name, namespace).await,
        ResourceKind::Ingress => get_in::<Ingress>(bundle, name, namespace).await,
        ResourceKind::PersistentVolumeClaim => {
            get_in::<PersistentVolumeClaim>(bundle, name, namespace).await
        }
        ResourceKind::HorizontalPodAutoscaler => {
            get_in::<HorizontalPodAutoscaler>(bundle, name, namespace).await
        }
        ResourceKind::ResourceQuota => get_in::<ResourceQuota>(bundle, name, namespace).await,
        ResourceKind::LimitRange => get_in::<LimitRange>(bundle, name, namespace).await,
        ResourceKind::PersistentVolume => {
            get_with(bundle, bundle.all::<PersistentVolume>(), name, "").await
        }
        ResourceKind::Namespace => get_with(bundle, bundle.all::<Namespace>(), name, "").await,
        ResourceKind::Node => get_with(bundle, bundle.all::<Node>(), name, "").await,
    }
}

/// Pods scheduled on `node`, in one namespace or across all of them.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_node_pods(
    bundle: &ClientBundle,
    node: &str,
    namespace: Option<&str>,
) -> Result<Vec<DomainResource>> {
    let params = ListParams::default().fields(&format!("spec.nodeName={}", node));
    match namespace {
        Some(ns) => list_with(bundle, bundle.namespaced::<Pod>(ns), &params, ns).await,
        None => list_with(bundle, bundle.all::<Pod>(), &params, "").await,
    }
}

/// Which log stream of a pod to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Required when the pod runs more than one container
    pub container: Option<String>,
    pub tail_lines: i64,
    /// Read the log of the previous, terminated container instance
    pub previous: bool,
    pub timestamps: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        LogOptions {
            container: None,
            tail_lines: defaults::LOG_TAIL_LINES,
            previous: false,
            timestamps: true,
        }
    }
}

/// The last lines of a pod's log.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_pod_logs(
    bundle: &ClientBundle,
    name: &str,
    namespace: &str,
    options: &LogOptions,
) -> Result<String> {
    let api: Api<Pod> = bundle.namespaced(namespace);
    let params = LogParams {
        container: options.container.clone(),
        tail_lines: Some(options.tail_lines),
        previous: options.previous,
        timestamps: options.timestamps,
        ..LogParams::default()
    };
    let what = format!("reading logs of pod '{}'", name);

    match bounded(bundle, &what, api.logs(name, &params)).await? {
        Ok(logs) => Ok(logs),
        Err(e) => {
            let err = DeckError::from_api(e, &bundle.context().to_string(), ResourceKind::Pod, namespace);
            warn!(pod = name, namespace, container = ?options.container, error = %err, "Failed to fetch pod logs");
            Err(err)
        }
    }
}

/// Resources of every label-bearing kind in a namespace.
#[derive(Debug, Default)]
pub struct LabelScan {
    pub resources: Vec<DomainResource>,
    /// Kinds that could not be listed, with the reason
    pub failed_kinds: Vec<(ResourceKind, String)>,
}

/// List all label-bearing kinds concurrently. A failing kind is recorded and skipped.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_resources_with_labels(bundle: &ClientBundle, namespace: &str) -> LabelScan {
    let results = join_all(ResourceKind::LABELLED.iter().map(|&kind| async move {
        (kind, list_resources(bundle, kind, namespace).await)
    }))
    .await;

    let mut scan = LabelScan::default();
    for (kind, result) in results {
        match result {
            Ok(resources) => scan.resources.extend(resources),
            Err(e) => {
                warn!(kind = %kind, namespace, error = %e, "Failed to list resources for label scan");
                scan.failed_kinds.push((kind, e.to_string()));
            }
        }
    }

    debug!(
        namespace,
        resources = scan.resources.len(),
        failed = scan.failed_kinds.len(),
        "Label scan complete"
    );
    scan
}

/// A cluster event as shown on the dashboard timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub message: String,
    /// Kind of the involved object
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub count: i32,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: DateTime<Utc>,
}

impl ClusterEvent {
    /// `None` when the event carries no usable timestamp.
    fn from_event(event: &Event) -> Option<Self> {
        let last_timestamp = event
            .last_timestamp
            .as_ref()
            .map(|t| t.0)
            .or_else(|| event.event_time.as_ref().map(|t| t.0))?;
        let involved = &event.involved_object;

        Some(ClusterEvent {
            event_type: event.type_.clone().unwrap_or_else(|| "Normal".to_string()),
            reason: event.reason.clone().unwrap_or_default(),
            message: event.message.clone().unwrap_or_default(),
            kind: involved.kind.clone().unwrap_or_default(),
            name: involved.name.clone().unwrap_or_default(),
            namespace: involved.namespace.clone().unwrap_or_default(),
            count: event.count.unwrap_or(1),
            first_timestamp: event.first_timestamp.as_ref().map(|t| t.0),
            last_timestamp,
        })
    }
}

/// Events no older than `window`, most recent first. `None` lists all namespaces.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_events(
    bundle: &ClientBundle,
    namespace: Option<&str>,
    window: Duration,
) -> Result<Vec<ClusterEvent>> {
    let api: Api<Event> = match namespace {
        Some(ns) => bundle.namespaced(ns),
        None => bundle.all(),
    };
    events_since(bundle, api, &ListParams::default(), namespace.unwrap_or(""), window).await
}

/// Events about one object, most recent first.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_resource_events(
    bundle: &ClientBundle,
    kind: ResourceKind,
    name: &str,
    namespace: &str,
    window: Duration,
) -> Result<Vec<ClusterEvent>> {
    let params = ListParams::default().fields(&format!(
        "involvedObject.kind={},involvedObject.name={}",
        kind, name
    ));
    events_since(bundle, bundle.namespaced(namespace), &params, namespace, window).await
}

/// Events about a node. Node events are recorded outside any single namespace.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn fetch_node_events(
    bundle: &ClientBundle,
    node: &str,
    window: Duration,
) -> Result<Vec<ClusterEvent>> {
    let params = ListParams::default().fields(&format!(
        "involvedObject.kind={},involvedObject.name={}",
        ResourceKind::Node,
        node
    ));
    events_since(bundle, bundle.all(), &params, "", window).await
}

async fn events_since(
    bundle: &ClientBundle,
    api: Api<Event>,
    params: &ListParams,
    namespace: &str,
    window: Duration,
) -> Result<Vec<ClusterEvent>> {
    let list = match bounded(bundle, "listing events", api.list(params)).await? {
        Ok(list) => list,
        Err(kube::Error::Api(resp)) if resp.code == 403 => {
            warn!(namespace, "Permission denied, treating event list as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DeckError::upstream(e, &bundle.context().to_string())),
    };

    let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
    let cutoff = Utc::now()
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut events: Vec<ClusterEvent> = list
        .items
        .iter()
        .filter_map(ClusterEvent::from_event)
        .filter(|e| e.last_timestamp >= cutoff)
        .collect();
    events.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
    Ok(events)
}

/// Whether the cluster answers a namespace list within the timeout.
#[instrument(skip(bundle), fields(context = %bundle.context()))]
pub async fn check_connection(bundle: &ClientBundle) -> bool {
    let api: Api<Namespace> = bundle.all();
    match bounded(bundle, "checking connection", api.list(&ListParams::default().limit(1))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            warn!(server = %bundle.server(), error = %e, "Cluster connection check failed");
            false
        }
        Err(e) => {
            warn!(server = %bundle.server(), error = %e, "Cluster connection check timed out");
            false
        }
    }
}
