// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{dependencies::from_pod_spec, text, Normalize, Normalizer};
use crate::types::{
    ContainerInfo, DaemonSetInfo, Dependencies, DeploymentInfo, DeploymentReplicas, PodInfo,
    PodPhase, ResourceDetails, ResourceKind, StatefulSetInfo, StatefulSetReplicas, WorkloadStatus,
};
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetStatus, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;
use std::str::FromStr;

const ROLLING_UPDATE: &str = "RollingUpdate";

fn match_labels(selector: Option<&LabelSelector>) -> BTreeMap<String, String> {
    selector
        .and_then(|s| s.match_labels.clone())
        .unwrap_or_default()
}

impl Normalize for Deployment {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();

        let replicas = DeploymentReplicas {
            desired: spec.and_then(|s| s.replicas).unwrap_or(0),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            available: status.and_then(|s| s.available_replicas).unwrap_or(0),
            unavailable: status.and_then(|s| s.unavailable_replicas).unwrap_or(0),
        };

        ResourceDetails::Deployment(DeploymentInfo {
            status: deployment_status(&replicas),
            strategy: spec
                .and_then(|s| s.strategy.as_ref())
                .and_then(|s| s.type_.clone())
                .unwrap_or_else(|| ROLLING_UPDATE.to_string()),
            selector: match_labels(spec.map(|s| &s.selector)),
            replicas,
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        let template = self.spec.as_ref().and_then(|s| s.template.spec.as_ref());
        Some(from_pod_spec(template, &[]))
    }
}

fn deployment_status(replicas: &DeploymentReplicas) -> WorkloadStatus {
    if replicas.unavailable > 0 {
        WorkloadStatus::Degraded
    } else if replicas.ready < replicas.desired {
        WorkloadStatus::Progressing
    } else {
        WorkloadStatus::Available
    }
}

impl Normalize for StatefulSet {
    const KIND: ResourceKind = ResourceKind::StatefulSet;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();

        let replicas = StatefulSetReplicas {
            desired: spec.and_then(|s| s.replicas).unwrap_or(0),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            current: status.and_then(|s| s.current_replicas).unwrap_or(0),
            updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        };

        ResourceDetails::StatefulSet(StatefulSetInfo {
            status: stateful_set_status(&replicas),
            selector: match_labels(spec.map(|s| &s.selector)),
            service_name: spec.map(|s| text(s.service_name.clone())).unwrap_or_default(),
            update_strategy: spec
                .and_then(|s| s.update_strategy.as_ref())
                .and_then(|s| s.type_.clone())
                .unwrap_or_else(|| ROLLING_UPDATE.to_string()),
            pod_management_policy: spec
                .and_then(|s| s.pod_management_policy.clone())
                .unwrap_or_else(|| "OrderedReady".to_string()),
            replicas,
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        let spec = self.spec.as_ref();
        let template = spec.and_then(|s| s.template.spec.as_ref());
        let claims = spec
            .and_then(|s| s.volume_claim_templates.as_deref())
            .unwrap_or_default();
        Some(from_pod_spec(template, claims))
    }
}

fn stateful_set_status(replicas: &StatefulSetReplicas) -> WorkloadStatus {
    if replicas.desired > 0 && replicas.ready == 0 {
        WorkloadStatus::Degraded
    } else if replicas.ready < replicas.desired {
        WorkloadStatus::Progressing
    } else {
        WorkloadStatus::Available
    }
}

impl Normalize for DaemonSet {
    const KIND: ResourceKind = ResourceKind::DaemonSet;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();

        ResourceDetails::DaemonSet(DaemonSetInfo {
            status: daemon_set_status(status),
            desired: status.map_or(0, |s| s.desired_number_scheduled),
            current: status.map_or(0, |s| s.current_number_scheduled),
            ready: status.map_or(0, |s| s.number_ready),
            up_to_date: status.and_then(|s| s.updated_number_scheduled).unwrap_or(0),
            available: status.and_then(|s| s.number_available).unwrap_or(0),
            selector: match_labels(spec.map(|s| &s.selector)),
            update_strategy: spec
                .and_then(|s| s.update_strategy.as_ref())
                .and_then(|s| s.type_.clone())
                .unwrap_or_else(|| ROLLING_UPDATE.to_string()),
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        let template = self.spec.as_ref().and_then(|s| s.template.spec.as_ref());
        Some(from_pod_spec(template, &[]))
    }
}

fn daemon_set_status(status: Option<&DaemonSetStatus>) -> WorkloadStatus {
    let Some(status) = status else {
        return WorkloadStatus::Unknown;
    };

    let desired = status.desired_number_scheduled;
    let ready = status.number_ready;
    let available = status.number_available.unwrap_or(0);

    if ready == 0 {
        WorkloadStatus::NotReady
    } else if ready < desired {
        WorkloadStatus::Degraded
    } else if available == desired && ready == desired {
        WorkloadStatus::Healthy
    } else {
        WorkloadStatus::Unknown
    }
}

impl Normalize for Pod {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let status = self.status.as_ref();
        let statuses = status
            .and_then(|s| s.container_statuses.as_deref())
            .unwrap_or_default();

        let containers: Vec<ContainerInfo> = statuses
            .iter()
            .map(|cs| ContainerInfo {
                name: cs.name.clone(),
                image: cs.image.clone(),
                ready: cs.ready,
                restart_count: cs.restart_count,
            })
            .collect();

        ResourceDetails::Pod(PodInfo {
            phase: pod_phase(status),
            node_name: self
                .spec
                .as_ref()
                .and_then(|s| s.node_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ip: status
                .and_then(|s| s.pod_ip.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            restart_count: containers.iter().map(|c| c.restart_count).sum(),
            containers,
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        Some(from_pod_spec(self.spec.as_ref(), &[]))
    }
}

fn pod_phase(status: Option<&PodStatus>) -> PodPhase {
    let Some(status) = status else {
        return PodPhase::Unknown;
    };

    let crash_looping = status
        .container_statuses
        .iter()
        .flatten()
        .filter_map(|cs| cs.state.as_ref()?.waiting.as_ref()?.reason.as_deref())
        .any(|reason| reason == "CrashLoopBackOff");
    if crash_looping {
        return PodPhase::CrashLoopBackOff;
    }

    status
        .phase
        .as_deref()
        .and_then(|p| PodPhase::from_str(p).ok())
        .unwrap_or(PodPhase::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn replicas(desired: i32, ready: i32, unavailable: i32) -> DeploymentReplicas {
        DeploymentReplicas {
            desired,
            ready,
            available: ready,
            unavailable,
        }
    }

    #[rstest]
    #[case(replicas(3, 3, 0), WorkloadStatus::Available)]
    #[case(replicas(3, 1, 0), WorkloadStatus::Progressing)]
    #[case(replicas(3, 2, 1), WorkloadStatus::Degraded)]
    #[case(replicas(0, 0, 0), WorkloadStatus::Available)]
    fn test_deployment_status(#[case] replicas: DeploymentReplicas, #[case] expected: WorkloadStatus) {
        assert_eq!(deployment_status(&replicas), expected);
    }

    #[rstest]
    #[case(3, 3, WorkloadStatus::Available)]
    #[case(3, 2, WorkloadStatus::Progressing)]
    #[case(3, 0, WorkloadStatus::Degraded)]
    #[case(0, 0, WorkloadStatus::Available)]
    fn test_stateful_set_status(#[case] desired: i32, #[case] ready: i32, #[case] expected: WorkloadStatus) {
        let replicas = StatefulSetReplicas {
            desired,
            ready,
            ..Default::default()
        };
        assert_eq!(stateful_set_status(&replicas), expected);
    }

    #[rstest]
    #[case(json!({"desiredNumberScheduled": 3, "currentNumberScheduled": 3, "numberReady": 3, "numberAvailable": 3, "numberMisscheduled": 0}), WorkloadStatus::Healthy)]
    #[case(json!({"desiredNumberScheduled": 3, "currentNumberScheduled": 3, "numberReady": 2, "numberAvailable": 2, "numberMisscheduled": 0}), WorkloadStatus::Degraded)]
    #[case(json!({"desiredNumberScheduled": 3, "currentNumberScheduled": 0, "numberReady": 0, "numberMisscheduled": 0}), WorkloadStatus::NotReady)]
    #[case(json!({"desiredNumberScheduled": 3, "currentNumberScheduled": 3, "numberReady": 3, "numberAvailable": 1, "numberMisscheduled": 0}), WorkloadStatus::Unknown)]
    fn test_daemon_set_status(#[case] status: serde_json::Value, #[case] expected: WorkloadStatus) {
        let status: DaemonSetStatus = serde_json::from_value(status).unwrap();
        assert_eq!(daemon_set_status(Some(&status)), expected);
    }

    #[test]
    fn test_daemon_set_without_status_is_unknown() {
        assert_eq!(daemon_set_status(None), WorkloadStatus::Unknown);
    }

    #[test]
    fn test_deployment_with_config_dependencies() {
        let deployment: Deployment = serde_json::from_value(json!({
            "metadata": {"name": "web", "namespace": "default"},
            "spec": {
                "replicas": 2,
                "selector": {"matchLabels": {"app": "web"}},
                "template": {"spec": {"containers": [{
                    "name": "web",
                    "envFrom": [{"configMapRef": {"name": "app-config"}}],
                    "env": [{"name": "TOKEN", "valueFrom": {"secretKeyRef": {"name": "app-secret", "key": "token"}}}]
                }]}}
            },
            "status": {"readyReplicas": 2, "availableReplicas": 2}
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&deployment, "default");
        assert_eq!(resource.config_map_refs(), ["app-config"]);
        assert_eq!(resource.secret_refs(), ["app-secret"]);
        assert_eq!(resource.status(), Some("Available"));

        let ResourceDetails::Deployment(info) = resource.details else {
            panic!("expected deployment details");
        };
        assert_eq!(info.strategy, "RollingUpdate");
        assert_eq!(info.selector.get("app").map(String::as_str), Some("web"));
    }

    #[test]
    fn test_stateful_set_claims_and_defaults() {
        let sts: StatefulSet = serde_json::from_value(json!({
            "metadata": {"name": "db"},
            "spec": {
                "serviceName": "db-headless",
                "replicas": 1,
                "selector": {},
                "template": {"spec": {"containers": [{"name": "db"}]}},
                "volumeClaimTemplates": [{"metadata": {"name": "data"}}]
            }
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&sts, "default");
        assert_eq!(resource.pvc_refs(), ["data"]);
        assert_eq!(resource.status(), Some("Degraded"));

        let ResourceDetails::StatefulSet(info) = resource.details else {
            panic!("expected statefulset details");
        };
        assert_eq!(info.service_name, "db-headless");
        assert_eq!(info.update_strategy, "RollingUpdate");
        assert_eq!(info.pod_management_policy, "OrderedReady");
    }

    #[test]
    fn test_pod_restarts_and_crash_loop() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "api-0"},
            "spec": {"containers": [{"name": "api"}, {"name": "sidecar"}]},
            "status": {
                "phase": "Running",
                "podIP": "10.0.0.7",
                "containerStatuses": [
                    {"name": "api", "image": "api:1", "imageID": "", "ready": false, "restartCount": 4,
                     "state": {"waiting": {"reason": "CrashLoopBackOff"}}},
                    {"name": "sidecar", "image": "proxy:1", "imageID": "", "ready": true, "restartCount": 1}
                ]
            }
        }))
        .unwrap();

        let ResourceDetails::Pod(info) = Normalizer::new().resource(&pod, "default").details else {
            panic!("expected pod details");
        };
        assert_eq!(info.phase, PodPhase::CrashLoopBackOff);
        assert_eq!(info.restart_count, 5);
        assert_eq!(info.node_name, "Unknown");
        assert_eq!(info.ip, "10.0.0.7");
        assert_eq!(info.containers.len(), 2);
    }

    #[test]
    fn test_pod_unrecognized_phase_is_unknown() {
        let status: PodStatus = serde_json::from_value(json!({"phase": "Evicted"})).unwrap();
        assert_eq!(pod_phase(Some(&status)), PodPhase::Unknown);
        assert_eq!(pod_phase(None), PodPhase::Unknown);
    }
}
