// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{text, Normalize, Normalizer};
use crate::types::{
    IngressInfo, IngressPathInfo, IngressRuleInfo, IngressTlsInfo, ResourceDetails, ResourceKind,
};
use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};

impl Normalize for Ingress {
    const KIND: ResourceKind = ResourceKind::Ingress;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();

        let rules: Vec<IngressRuleInfo> = spec
            .and_then(|s| s.rules.as_deref())
            .unwrap_or_default()
            .iter()
            .map(|rule| IngressRuleInfo {
                host: rule.host.clone(),
                paths: rule
                    .http
                    .iter()
                    .flat_map(|h| h.paths.iter())
                    .map(path_info)
                    .collect(),
            })
            .collect();

        let mut hosts: Vec<String> = Vec::new();
        for host in rules.iter().filter_map(|r| r.host.as_ref()) {
            if !hosts.contains(host) {
                hosts.push(host.clone());
            }
        }

        let tls = spec
            .and_then(|s| s.tls.as_deref())
            .unwrap_or_default()
            .iter()
            .map(|t| IngressTlsInfo {
                hosts: t.hosts.clone().unwrap_or_default(),
                secret_name: t.secret_name.clone(),
            })
            .collect();

        ResourceDetails::Ingress(IngressInfo {
            class_name: spec.and_then(|s| s.ingress_class_name.clone()),
            hosts,
            rules,
            tls,
        })
    }
}

fn path_info(path: &HTTPIngressPath) -> IngressPathInfo {
    let service = path.backend.service.as_ref();
    let port = service.and_then(|s| s.port.as_ref()).and_then(|p| {
        p.number
            .map(|n| n.to_string())
            .or_else(|| p.name.clone())
    });
    let path_type = text(path.path_type.clone());

    IngressPathInfo {
        path: path.path.clone().unwrap_or_else(|| "/".to_string()),
        path_type: if path_type.is_empty() {
            "Prefix".to_string()
        } else {
            path_type
        },
        service: service.map(|s| s.name.clone()).unwrap_or_default(),
        port,
    }
}
