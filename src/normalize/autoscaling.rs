// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{Normalize, Normalizer};
use crate::types::{AutoscalerInfo, ResourceDetails, ResourceKind};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;

impl Normalize for HorizontalPodAutoscaler {
    const KIND: ResourceKind = ResourceKind::HorizontalPodAutoscaler;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();

        let cpu_target = spec
            .and_then(|s| s.metrics.as_deref())
            .unwrap_or_default()
            .iter()
            .filter(|m| m.type_ == "Resource")
            .filter_map(|m| m.resource.as_ref())
            .find(|r| r.name == "cpu")
            .and_then(|r| r.target.average_utilization);

        let cpu_current = status
            .and_then(|s| s.current_metrics.as_deref())
            .unwrap_or_default()
            .iter()
            .filter(|m| m.type_ == "Resource")
            .filter_map(|m| m.resource.as_ref())
            .find(|r| r.name == "cpu")
            .and_then(|r| r.current.average_utilization);

        ResourceDetails::HorizontalPodAutoscaler(AutoscalerInfo {
            target_kind: spec.map(|s| s.scale_target_ref.kind.clone()).unwrap_or_default(),
            target_name: spec.map(|s| s.scale_target_ref.name.clone()).unwrap_or_default(),
            min_replicas: spec.and_then(|s| s.min_replicas).unwrap_or(1),
            max_replicas: spec.map_or(1, |s| s.max_replicas),
            current_replicas: status.and_then(|s| s.current_replicas).unwrap_or(0),
            desired_replicas: status.map_or(0, |s| s.desired_replicas),
            cpu_target_utilization: cpu_target.unwrap_or(0),
            cpu_current_utilization: cpu_current.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cpu_utilization() {
        let hpa: HorizontalPodAutoscaler = serde_json::from_value(json!({
            "metadata": {"name": "web"},
            "spec": {
                "scaleTargetRef": {"apiVersion": "apps/v1", "kind": "Deployment", "name": "web"},
                "maxReplicas": 10,
                "metrics": [{"type": "Resource", "resource": {
                    "name": "cpu",
                    "target": {"type": "Utilization", "averageUtilization": 70}
                }}]
            },
            "status": {
                "currentReplicas": 3,
                "desiredReplicas": 4,
                "currentMetrics": [{"type": "Resource", "resource": {
                    "name": "cpu",
                    "current": {"averageUtilization": 85}
                }}]
            }
        }))
        .unwrap();

        let ResourceDetails::HorizontalPodAutoscaler(info) =
            Normalizer::new().resource(&hpa, "default").details
        else {
            panic!("expected autoscaler details");
        };
        assert_eq!(info.target_kind, "Deployment");
        assert_eq!(info.min_replicas, 1);
        assert_eq!(info.max_replicas, 10);
        assert_eq!(info.desired_replicas, 4);
        assert_eq!(info.cpu_target_utilization, 70);
        assert_eq!(info.cpu_current_utilization, 85);
    }

    #[test]
    fn test_empty_autoscaler() {
        let ResourceDetails::HorizontalPodAutoscaler(info) =
            Normalizer::new().resource(&HorizontalPodAutoscaler::default(), "default").details
        else {
            panic!("expected autoscaler details");
        };
        assert_eq!(info.min_replicas, 1);
        assert_eq!(info.max_replicas, 1);
        assert_eq!(info.cpu_current_utilization, 0);
    }
}
