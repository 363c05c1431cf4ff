// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{Normalize, Normalizer};
use crate::constants::NODE_ROLE_PREFIX;
use crate::types::{
    NamespaceInfo, NamespacePhase, NodeInfo, NodeResources, NodeStatus, ResourceDetails,
    ResourceKind,
};
use k8s_openapi::api::core::v1::{Namespace, Node, NodeStatus as ApiNodeStatus};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use std::str::FromStr;

impl Normalize for Namespace {
    const KIND: ResourceKind = ResourceKind::Namespace;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let phase = self
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .and_then(|p| NamespacePhase::from_str(p).ok())
            .unwrap_or(NamespacePhase::Unknown);
        ResourceDetails::Namespace(NamespaceInfo { phase })
    }
}

impl Normalize for Node {
    const KIND: ResourceKind = ResourceKind::Node;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let status = self.status.as_ref();

        let mut roles: Vec<String> = self
            .metadata
            .labels
            .iter()
            .flat_map(|l| l.keys())
            .filter_map(|k| k.strip_prefix(NODE_ROLE_PREFIX))
            .map(str::to_string)
            .collect();
        if roles.is_empty() {
            roles.push("<none>".to_string());
        }

        ResourceDetails::Node(NodeInfo {
            status: node_status(status),
            roles,
            version: status
                .and_then(|s| s.node_info.as_ref())
                .map_or_else(|| "Unknown".to_string(), |i| i.kubelet_version.clone()),
            capacity: node_resources(status.and_then(|s| s.capacity.as_ref())),
            allocatable: node_resources(status.and_then(|s| s.allocatable.as_ref())),
        })
    }
}

fn node_status(status: Option<&ApiNodeStatus>) -> NodeStatus {
    let ready = status
        .and_then(|s| s.conditions.as_ref())
        .and_then(|c| c.iter().find(|c| c.type_ == "Ready"));
    match ready {
        Some(c) if c.status == "True" => NodeStatus::Ready,
        Some(_) => NodeStatus::NotReady,
        None => NodeStatus::Unknown,
    }
}

fn node_resources(quantities: Option<&BTreeMap<String, Quantity>>) -> NodeResources {
    let get = |key: &str| {
        quantities
            .and_then(|q| q.get(key))
            .map_or_else(|| "0".to_string(), |q| q.0.clone())
    };
    NodeResources {
        cpu: get("cpu"),
        memory: get("memory"),
        pods: get("pods"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_roles_and_resources() {
        let node: Node = serde_json::from_value(json!({
            "metadata": {"name": "cp-1", "labels": {
                "node-role.kubernetes.io/control-plane": "",
                "kubernetes.io/hostname": "cp-1"
            }},
            "status": {
                "conditions": [{"type": "Ready", "status": "True"}],
                "capacity": {"cpu": "4", "memory": "16Gi", "pods": "110"},
                "allocatable": {"cpu": "3800m"}
            }
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&node, "default");
        assert_eq!(resource.status(), Some("Ready"));
        let ResourceDetails::Node(info) = resource.details else {
            panic!("expected node details");
        };
        assert_eq!(info.roles, vec!["control-plane"]);
        assert_eq!(info.version, "Unknown");
        assert_eq!(info.capacity.memory, "16Gi");
        assert_eq!(info.allocatable.cpu, "3800m");
        assert_eq!(info.allocatable.pods, "0");
    }

    #[test]
    fn test_node_without_roles_or_conditions() {
        let ResourceDetails::Node(info) = Normalizer::new().resource(&Node::default(), "").details else {
            panic!("expected node details");
        };
        assert_eq!(info.roles, vec!["<none>"]);
        assert_eq!(info.status, NodeStatus::Unknown);
    }

    #[test]
    fn test_namespace_phase() {
        let ns: Namespace =
            serde_json::from_value(json!({"metadata": {"name": "old"}, "status": {"phase": "Terminating"}}))
                .unwrap();
        assert_eq!(Normalizer::new().resource(&ns, "").status(), Some("Terminating"));
        assert_eq!(
            Normalizer::new().resource(&Namespace::default(), "").status(),
            Some("Unknown")
        );
    }
}
