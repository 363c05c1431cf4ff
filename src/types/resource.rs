// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Normalized resource shape returned to the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Resource kinds understood by the normalizer.
///
/// Ordering follows declaration order and is used wherever kinds are kept in a set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum ResourceKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Pod,
    Service,
    ConfigMap,
    Secret,
    Job,
    CronJob,
    Ingress,
    PersistentVolumeClaim,
    PersistentVolume,
    Namespace,
    Node,
    HorizontalPodAutoscaler,
    ResourceQuota,
    LimitRange,
}

impl ResourceKind {
    /// Kinds scanned when building the label browser for a namespace.
    pub const LABELLED: [ResourceKind; 10] = [
        ResourceKind::Deployment,
        ResourceKind::StatefulSet,
        ResourceKind::DaemonSet,
        ResourceKind::Pod,
        ResourceKind::Service,
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::Job,
        ResourceKind::CronJob,
        ResourceKind::Ingress,
    ];

    pub fn api_group(self) -> ApiGroup {
        match self {
            ResourceKind::Deployment | ResourceKind::StatefulSet | ResourceKind::DaemonSet => {
                ApiGroup::Workloads
            }
            ResourceKind::Job | ResourceKind::CronJob => ApiGroup::Batch,
            ResourceKind::Ingress => ApiGroup::Networking,
            ResourceKind::HorizontalPodAutoscaler => ApiGroup::Autoscaling,
            ResourceKind::Pod
            | ResourceKind::Service
            | ResourceKind::ConfigMap
            | ResourceKind::Secret
            | ResourceKind::PersistentVolumeClaim
            | ResourceKind::PersistentVolume
            | ResourceKind::Namespace
            | ResourceKind::Node
            | ResourceKind::ResourceQuota
            | ResourceKind::LimitRange => ApiGroup::Core,
        }
    }

    /// Workloads carry a pod template and therefore dependency references.
    pub fn is_workload(self) -> bool {
        matches!(
            self,
            ResourceKind::Deployment
                | ResourceKind::StatefulSet
                | ResourceKind::DaemonSet
                | ResourceKind::Pod
                | ResourceKind::Job
                | ResourceKind::CronJob
        )
    }

    pub fn is_namespaced(self) -> bool {
        !matches!(
            self,
            ResourceKind::PersistentVolume | ResourceKind::Namespace | ResourceKind::Node
        )
    }
}

/// API groups a client bundle serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ApiGroup {
    #[strum(serialize = "apps/v1")]
    Workloads,
    #[strum(serialize = "v1")]
    Core,
    #[strum(serialize = "networking.k8s.io/v1")]
    Networking,
    #[strum(serialize = "batch/v1")]
    Batch,
    #[strum(serialize = "autoscaling/v2")]
    Autoscaling,
}

/// ConfigMaps, Secrets and claims a workload depends on, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    pub config_map_refs: Vec<String>,
    pub secret_refs: Vec<String>,
    pub pvc_refs: Vec<String>,
}

/// A cluster object reduced to the fields the dashboard renders.
///
/// Built fresh on every fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResource {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub age: String,
    /// Present for workload kinds only
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,
    pub details: ResourceDetails,
}

impl DomainResource {
    pub fn status(&self) -> Option<&'static str> {
        self.details.status()
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn config_map_refs(&self) -> &[String] {
        self.dependencies.as_ref().map_or(&[], |d| &d.config_map_refs)
    }

    pub fn secret_refs(&self) -> &[String] {
        self.dependencies.as_ref().map_or(&[], |d| &d.secret_refs)
    }

    pub fn pvc_refs(&self) -> &[String] {
        self.dependencies.as_ref().map_or(&[], |d| &d.pvc_refs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceDetails {
    Deployment(DeploymentInfo),
    StatefulSet(StatefulSetInfo),
    DaemonSet(DaemonSetInfo),
    Pod(PodInfo),
    Service(ServiceInfo),
    ConfigMap(ConfigMapInfo),
    Secret(SecretInfo),
    Job(JobInfo),
    CronJob(CronJobInfo),
    Ingress(IngressInfo),
    PersistentVolumeClaim(ClaimInfo),
    PersistentVolume(VolumeInfo),
    Namespace(NamespaceInfo),
    Node(NodeInfo),
    HorizontalPodAutoscaler(AutoscalerInfo),
    ResourceQuota(QuotaInfo),
    LimitRange(LimitRangeInfo),
}

impl ResourceDetails {
    pub fn status(&self) -> Option<&'static str> {
        match self {
            ResourceDetails::Deployment(d) => Some(d.status.into()),
            ResourceDetails::StatefulSet(s) => Some(s.status.into()),
            ResourceDetails::DaemonSet(d) => Some(d.status.into()),
            ResourceDetails::Pod(p) => Some(p.phase.into()),
            ResourceDetails::Job(j) => Some(j.status.into()),
            ResourceDetails::CronJob(c) => Some(c.status.into()),
            ResourceDetails::PersistentVolumeClaim(c) => Some(c.phase.into()),
            ResourceDetails::PersistentVolume(v) => Some(v.phase.into()),
            ResourceDetails::Namespace(n) => Some(n.phase.into()),
            ResourceDetails::Node(n) => Some(n.status.into()),
            ResourceDetails::Service(_)
            | ResourceDetails::ConfigMap(_)
            | ResourceDetails::Secret(_)
            | ResourceDetails::Ingress(_)
            | ResourceDetails::HorizontalPodAutoscaler(_)
            | ResourceDetails::ResourceQuota(_)
            | ResourceDetails::LimitRange(_) => None,
        }
    }
}

/// Health of a replica-managing workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
pub enum WorkloadStatus {
    Available,
    Progressing,
    Degraded,
    Healthy,
    #[serde(rename = "Not Ready")]
    #[strum(serialize = "Not Ready")]
    NotReady,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
pub enum PodPhase {
    Running,
    Pending,
    Succeeded,
    Failed,
    Unknown,
    CrashLoopBackOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
pub enum JobStatus {
    Complete,
    Failed,
    Running,
    Pending,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
pub enum CronJobStatus {
    Active,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
pub enum ClaimPhase {
    Bound,
    Pending,
    Lost,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
pub enum VolumePhase {
    Available,
    Bound,
    Released,
    Pending,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
pub enum NamespacePhase {
    Active,
    Terminating,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
pub enum NodeStatus {
    Ready,
    NotReady,
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentReplicas {
    pub desired: i32,
    pub ready: i32,
    pub available: i32,
    pub unavailable: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub status: WorkloadStatus,
    pub replicas: DeploymentReplicas,
    pub strategy: String,
    pub selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatefulSetReplicas {
    pub desired: i32,
    pub ready: i32,
    pub current: i32,
    pub updated: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSetInfo {
    pub status: WorkloadStatus,
    pub replicas: StatefulSetReplicas,
    pub selector: BTreeMap<String, String>,
    pub service_name: String,
    pub update_strategy: String,
    pub pod_management_policy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSetInfo {
    pub status: WorkloadStatus,
    pub desired: i32,
    pub current: i32,
    pub ready: i32,
    pub up_to_date: i32,
    pub available: i32,
    pub selector: BTreeMap<String, String>,
    pub update_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    pub ready: bool,
    pub restart_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub phase: PodPhase,
    pub node_name: String,
    pub ip: String,
    pub restart_count: i32,
    pub containers: Vec<ContainerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub protocol: String,
    pub port: i32,
    pub target_port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_port: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: String,
    #[serde(rename = "externalIPs")]
    pub external_ips: Vec<String>,
    pub ports: Vec<PortInfo>,
    pub selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMapInfo {
    pub data: BTreeMap<String, String>,
}

/// Secret values are never carried, only the key names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretInfo {
    #[serde(rename = "type")]
    pub secret_type: String,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionInfo {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub status: JobStatus,
    pub completions: i32,
    pub succeeded: i32,
    pub failed: i32,
    pub active: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub conditions: Vec<ConditionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobInfo {
    pub status: CronJobStatus,
    pub schedule: String,
    pub suspend: bool,
    pub active: usize,
    pub last_schedule: Option<DateTime<Utc>>,
    pub last_successful_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressPathInfo {
    pub path: String,
    pub path_type: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressRuleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub paths: Vec<IngressPathInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressTlsInfo {
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub hosts: Vec<String>,
    pub rules: Vec<IngressRuleInfo>,
    pub tls: Vec<IngressTlsInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInfo {
    pub phase: ClaimPhase,
    pub volume: String,
    pub capacity: String,
    pub access_modes: Vec<String>,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub phase: VolumePhase,
    pub capacity: String,
    pub access_modes: Vec<String>,
    pub reclaim_policy: String,
    /// `namespace/name` of the bound claim, empty when unbound
    pub claim: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceInfo {
    pub phase: NamespacePhase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeResources {
    pub cpu: String,
    pub memory: String,
    pub pods: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub status: NodeStatus,
    pub roles: Vec<String>,
    pub version: String,
    pub capacity: NodeResources,
    pub allocatable: NodeResources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalerInfo {
    pub target_kind: String,
    pub target_name: String,
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub current_replicas: i32,
    pub desired_replicas: i32,
    pub cpu_target_utilization: i32,
    pub cpu_current_utilization: i32,
}

/// Quantities of a resource quota, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuotaInfo {
    pub hard: BTreeMap<String, String>,
    pub used: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitInfo {
    #[serde(rename = "type")]
    pub limit_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_request: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit_request_ratio: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitRangeInfo {
    pub limits: Vec<LimitInfo>,
}
