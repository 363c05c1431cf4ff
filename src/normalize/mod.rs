// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Transformation of raw cluster objects into [`DomainResource`]s.
//!
//! Normalization never fails: every field may be absent upstream and is replaced by a
//! default. Objects that do not even decode into their API type are logged and
//! normalized from their metadata alone.

pub mod dependencies;
pub mod time;

mod autoscaling;
mod batch;
mod cluster;
mod networking;
mod policy;
mod services;
mod workloads;

pub use dependencies::extract_dependencies;
pub use time::{calculate_age, calculate_duration};

use crate::types::{Dependencies, DomainResource, ResourceDetails, ResourceKind};
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, LimitRange, Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod,
    ResourceQuota, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use serde::de::DeserializeOwned;
use tracing::warn;

/// An API type with a normalized form.
pub trait Normalize: Resource + DeserializeOwned + Default {
    const KIND: ResourceKind;

    /// Kind-specific payload
    fn details(&self, normalizer: &Normalizer) -> ResourceDetails;

    /// Referenced ConfigMaps, Secrets and claims; only workloads have any
    fn dependencies(&self) -> Option<Dependencies> {
        None
    }
}

/// Normalizes objects against a fixed reference time, so ages within one batch agree.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    now: DateTime<Utc>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Normalizer { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Normalize a decoded object. `namespace_fallback` is used when the object carries no namespace.
    pub fn resource<K: Normalize>(&self, obj: &K, namespace_fallback: &str) -> DomainResource {
        let meta = obj.meta();
        let namespace = match &meta.namespace {
            Some(ns) if !ns.is_empty() => ns.clone(),
            _ if K::KIND.is_namespaced() => namespace_fallback.to_string(),
            _ => String::new(),
        };

        let dependencies = obj.dependencies();
        debug_assert_eq!(
            dependencies.is_some(),
            K::KIND.is_workload(),
            "{} dependency references",
            K::KIND
        );

        DomainResource {
            kind: K::KIND,
            name: meta.name.clone().unwrap_or_default(),
            namespace,
            labels: meta.labels.clone().unwrap_or_default(),
            annotations: meta.annotations.clone().unwrap_or_default(),
            age: calculate_age(meta.creation_timestamp.as_ref().map(|t| t.0), self.now),
            dependencies,
            details: obj.details(self),
        }
    }

    /// Normalize a raw JSON object of the given kind.
    pub fn normalize(
        &self,
        kind: ResourceKind,
        raw: &serde_json::Value,
        namespace_fallback: &str,
    ) -> DomainResource {
        match kind {
            ResourceKind::Deployment => self.decoded::<Deployment>(raw, namespace_fallback),
            ResourceKind::StatefulSet => self.decoded::<StatefulSet>(raw, namespace_fallback),
            ResourceKind::DaemonSet => self.decoded::<DaemonSet>(raw, namespace_fallback),
            ResourceKind::Pod => self.decoded::<Pod>(raw, namespace_fallback),
            ResourceKind::Service => self.decoded::<Service>(raw, namespace_fallback),
            ResourceKind::ConfigMap => self.decoded::<ConfigMap>(raw, namespace_fallback),
            ResourceKind::Secret => self.decoded::<Secret>(raw, namespace_fallback),
            ResourceKind::Job => self.decoded::<Job>(raw, namespace_fallback),
            ResourceKind::CronJob => self.decoded::<CronJob>(raw, namespace_fallback),
            ResourceKind::Ingress => self.decoded::<Ingress>(raw, namespace_fallback),
            ResourceKind::PersistentVolumeClaim => {
                self.decoded::<PersistentVolumeClaim>(raw, namespace_fallback)
            }
            ResourceKind::PersistentVolume => {
                self.decoded::<PersistentVolume>(raw, namespace_fallback)
            }
            ResourceKind::Namespace => self.decoded::<Namespace>(raw, namespace_fallback),
            ResourceKind::Node => self.decoded::<Node>(raw, namespace_fallback),
            ResourceKind::HorizontalPodAutoscaler => {
                self.decoded::<HorizontalPodAutoscaler>(raw, namespace_fallback)
            }
            ResourceKind::ResourceQuota => self.decoded::<ResourceQuota>(raw, namespace_fallback),
            ResourceKind::LimitRange => self.decoded::<LimitRange>(raw, namespace_fallback),
        }
    }

    fn decoded<K: Normalize>(&self, raw: &serde_json::Value, namespace_fallback: &str) -> DomainResource {
        self.resource(&decode_lenient::<K>(raw), namespace_fallback)
    }
}

/// Normalize a raw JSON object at the current time.
pub fn normalize(
    kind: ResourceKind,
    raw: &serde_json::Value,
    namespace_fallback: &str,
) -> DomainResource {
    Normalizer::new().normalize(kind, raw, namespace_fallback)
}

/// Fields that are `String` on some API versions and `Option<String>` on others.
fn text(value: impl Into<Option<String>>) -> String {
    value.into().unwrap_or_default()
}

fn decode_lenient<K: Normalize>(raw: &serde_json::Value) -> K {
    match serde_json::from_value::<K>(raw.clone()) {
        Ok(obj) => obj,
        Err(e) => {
            warn!(kind = %K::KIND, error = %e, "Object does not match its API schema, keeping metadata only");
            let mut obj = K::default();
            if let Some(meta) = raw
                .get("metadata")
                .and_then(|m| serde_json::from_value::<ObjectMeta>(m.clone()).ok())
            {
                *obj.meta_mut() = meta;
            }
            obj
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceDetails, WorkloadStatus};
    use serde_json::json;
    use strum::IntoEnumIterator;

    fn normalizer() -> Normalizer {
        Normalizer::at(
            DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn test_metadata_defaults() {
        let resource = normalizer().normalize(ResourceKind::ConfigMap, &json!({}), "team-a");

        assert_eq!(resource.name, "");
        assert_eq!(resource.namespace, "team-a");
        assert!(resource.labels.is_empty());
        assert!(resource.annotations.is_empty());
        assert_eq!(resource.age, "Unknown");
        assert!(resource.dependencies.is_none());
    }

    #[test]
    fn test_object_namespace_wins_over_fallback() {
        let raw = json!({"metadata": {
            "name": "web",
            "namespace": "prod",
            "labels": {"app": "web"},
            "creationTimestamp": "2026-03-01T09:30:00Z"
        }});
        let resource = normalizer().normalize(ResourceKind::Service, &raw, "default");

        assert_eq!(resource.namespace, "prod");
        assert_eq!(resource.label("app"), Some("web"));
        assert_eq!(resource.age, "2h");
    }

    #[test]
    fn test_cluster_scoped_kinds_have_no_namespace() {
        let raw = json!({"metadata": {"name": "worker-1"}});
        let resource = normalizer().normalize(ResourceKind::Node, &raw, "default");
        assert_eq!(resource.namespace, "");
    }

    #[test]
    fn test_undecodable_object_keeps_metadata() {
        let raw = json!({
            "metadata": {"name": "broken", "labels": {"tier": "backend"}},
            "spec": {"replicas": "three"}
        });
        let resource = normalizer().normalize(ResourceKind::Deployment, &raw, "default");

        assert_eq!(resource.name, "broken");
        assert_eq!(resource.label("tier"), Some("backend"));
        assert_eq!(resource.status(), Some("Available"));
        let ResourceDetails::Deployment(info) = &resource.details else {
            panic!("expected deployment details");
        };
        assert_eq!(info.status, WorkloadStatus::Available);
        assert_eq!(info.replicas.desired, 0);
    }

    #[test]
    fn test_workloads_always_carry_dependencies() {
        let raw = json!({"metadata": {"name": "api"}, "spec": {
            "selector": {},
            "template": {"spec": {"containers": [{"name": "api"}]}}
        }});
        let resource = normalizer().normalize(ResourceKind::Deployment, &raw, "default");
        assert_eq!(resource.dependencies, Some(Dependencies::default()));
    }

    #[test]
    fn test_only_workloads_carry_dependencies() {
        for kind in ResourceKind::iter() {
            let resource = normalizer().normalize(kind, &json!({"metadata": {"name": "x"}}), "default");
            assert_eq!(resource.kind, kind);
            assert_eq!(resource.dependencies.is_some(), kind.is_workload(), "{}", kind);
        }
    }
}
