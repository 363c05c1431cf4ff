// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{text, Normalize, Normalizer};
use crate::types::{
    ClaimInfo, ClaimPhase, ConfigMapInfo, PortInfo, ResourceDetails, ResourceKind, SecretInfo,
    ServiceInfo, VolumeInfo, VolumePhase,
};
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolume, PersistentVolumeClaim, Secret, Service, ServicePort,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeSet;
use std::str::FromStr;

impl Normalize for Service {
    const KIND: ResourceKind = ResourceKind::Service;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();

        ResourceDetails::Service(ServiceInfo {
            service_type: spec
                .and_then(|s| s.type_.clone())
                .unwrap_or_else(|| "ClusterIP".to_string()),
            cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
            external_ips: spec.and_then(|s| s.external_ips.clone()).unwrap_or_default(),
            ports: spec
                .and_then(|s| s.ports.as_deref())
                .unwrap_or_default()
                .iter()
                .map(port_info)
                .collect(),
            selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
        })
    }
}

fn port_info(port: &ServicePort) -> PortInfo {
    PortInfo {
        name: port.name.clone(),
        protocol: port.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
        port: port.port,
        // The API server defaults the target port to the service port
        target_port: match &port.target_port {
            Some(IntOrString::Int(p)) => p.to_string(),
            Some(IntOrString::String(name)) => name.clone(),
            None => port.port.to_string(),
        },
        node_port: port.node_port,
    }
}

impl Normalize for ConfigMap {
    const KIND: ResourceKind = ResourceKind::ConfigMap;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        ResourceDetails::ConfigMap(ConfigMapInfo {
            data: self.data.clone().unwrap_or_default(),
        })
    }
}

impl Normalize for Secret {
    const KIND: ResourceKind = ResourceKind::Secret;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let keys: BTreeSet<String> = self
            .data
            .iter()
            .flat_map(|d| d.keys())
            .chain(self.string_data.iter().flat_map(|d| d.keys()))
            .cloned()
            .collect();

        ResourceDetails::Secret(SecretInfo {
            secret_type: self.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
            keys: keys.into_iter().collect(),
        })
    }
}

impl Normalize for PersistentVolumeClaim {
    const KIND: ResourceKind = ResourceKind::PersistentVolumeClaim;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();

        ResourceDetails::PersistentVolumeClaim(ClaimInfo {
            phase: status
                .and_then(|s| s.phase.as_deref())
                .and_then(|p| ClaimPhase::from_str(p).ok())
                .unwrap_or(ClaimPhase::Unknown),
            volume: spec.and_then(|s| s.volume_name.clone()).unwrap_or_default(),
            capacity: status
                .and_then(|s| s.capacity.as_ref())
                .and_then(|c| c.get("storage"))
                .map_or_else(|| "0".to_string(), |q| q.0.clone()),
            access_modes: spec.and_then(|s| s.access_modes.clone()).unwrap_or_default(),
            storage_class: spec
                .and_then(|s| s.storage_class_name.clone())
                .unwrap_or_default(),
        })
    }
}

impl Normalize for PersistentVolume {
    const KIND: ResourceKind = ResourceKind::PersistentVolume;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();

        ResourceDetails::PersistentVolume(VolumeInfo {
            phase: self
                .status
                .as_ref()
                .and_then(|s| s.phase.as_deref())
                .and_then(|p| VolumePhase::from_str(p).ok())
                .unwrap_or(VolumePhase::Unknown),
            capacity: spec
                .and_then(|s| s.capacity.as_ref())
                .and_then(|c| c.get("storage"))
                .map_or_else(|| "0".to_string(), |q| q.0.clone()),
            access_modes: spec.and_then(|s| s.access_modes.clone()).unwrap_or_default(),
            reclaim_policy: spec
                .and_then(|s| s.persistent_volume_reclaim_policy.clone())
                .unwrap_or_else(|| "Retain".to_string()),
            claim: spec
                .and_then(|s| s.claim_ref.as_ref())
                .map(|r| format!("{}/{}", text(r.namespace.clone()), text(r.name.clone())))
                .unwrap_or_default(),
            storage_class: spec
                .and_then(|s| s.storage_class_name.clone())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_defaults() {
        let svc: Service = serde_json::from_value(json!({
            "metadata": {"name": "web"},
            "spec": {
                "clusterIP": "10.96.0.12",
                "selector": {"app": "web"},
                "ports": [
                    {"port": 80, "targetPort": 8080},
                    {"name": "metrics", "port": 9090, "targetPort": "metrics", "protocol": "UDP"},
                    {"port": 443}
                ]
            }
        }))
        .unwrap();

        let ResourceDetails::Service(info) = Normalizer::new().resource(&svc, "default").details else {
            panic!("expected service details");
        };
        assert_eq!(info.service_type, "ClusterIP");
        assert_eq!(info.cluster_ip, "10.96.0.12");
        assert!(info.external_ips.is_empty());
        assert_eq!(info.ports[0].protocol, "TCP");
        assert_eq!(info.ports[0].target_port, "8080");
        assert_eq!(info.ports[1].target_port, "metrics");
        assert_eq!(info.ports[1].protocol, "UDP");
        assert_eq!(info.ports[2].target_port, "443");
    }

    #[test]
    fn test_secret_exposes_key_names_only() {
        let secret: Secret = serde_json::from_value(json!({
            "metadata": {"name": "creds"},
            "data": {"username": "YWRtaW4=", "password": "aHVudGVyMg=="}
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&secret, "default");
        let serialized = serde_json::to_string(&resource).unwrap();
        assert!(!serialized.contains("aHVudGVyMg=="));

        let ResourceDetails::Secret(info) = resource.details else {
            panic!("expected secret details");
        };
        assert_eq!(info.secret_type, "Opaque");
        assert_eq!(info.keys, vec!["password", "username"]);
    }

    #[test]
    fn test_claim_defaults_and_capacity() {
        let bound: PersistentVolumeClaim = serde_json::from_value(json!({
            "metadata": {"name": "data"},
            "spec": {"accessModes": ["ReadWriteOnce"], "storageClassName": "fast", "volumeName": "pv-1"},
            "status": {"phase": "Bound", "capacity": {"storage": "10Gi"}}
        }))
        .unwrap();
        let ResourceDetails::PersistentVolumeClaim(info) =
            Normalizer::new().resource(&bound, "default").details
        else {
            panic!("expected claim details");
        };
        assert_eq!(info.phase, ClaimPhase::Bound);
        assert_eq!(info.capacity, "10Gi");
        assert_eq!(info.access_modes, vec!["ReadWriteOnce"]);

        let empty = PersistentVolumeClaim::default();
        let ResourceDetails::PersistentVolumeClaim(info) =
            Normalizer::new().resource(&empty, "default").details
        else {
            panic!("expected claim details");
        };
        assert_eq!(info.phase, ClaimPhase::Unknown);
        assert_eq!(info.capacity, "0");
        assert_eq!(info.volume, "");
    }

    #[test]
    fn test_bound_volume() {
        let pv: PersistentVolume = serde_json::from_value(json!({
            "metadata": {"name": "pv-data"},
            "spec": {
                "capacity": {"storage": "20Gi"},
                "accessModes": ["ReadWriteOnce"],
                "claimRef": {"namespace": "shop", "name": "data"},
                "storageClassName": "standard"
            },
            "status": {"phase": "Bound"}
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&pv, "shop");
        assert_eq!(resource.namespace, "");
        assert_eq!(resource.status(), Some("Bound"));
        let ResourceDetails::PersistentVolume(info) = resource.details else {
            panic!("expected volume details");
        };
        assert_eq!(info.capacity, "20Gi");
        assert_eq!(info.claim, "shop/data");
        assert_eq!(info.reclaim_policy, "Retain");
        assert_eq!(info.storage_class, "standard");
    }

    #[test]
    fn test_unbound_volume_defaults() {
        let pv: PersistentVolume =
            serde_json::from_value(json!({"metadata": {"name": "pv-spare"}})).unwrap();

        let ResourceDetails::PersistentVolume(info) = Normalizer::new().resource(&pv, "").details else {
            panic!("expected volume details");
        };
        assert_eq!(info.phase, VolumePhase::Unknown);
        assert_eq!(info.capacity, "0");
        assert_eq!(info.claim, "");
        assert!(info.access_modes.is_empty());
    }
}
