// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Implicit ConfigMap, Secret and claim references of a workload.

use crate::types::Dependencies;
use k8s_openapi::api::core::v1::{
    Container, LocalObjectReference, PersistentVolumeClaim, PodSpec, Volume,
};

/// Scan containers, volumes, pull secrets and claim templates for referenced names.
///
/// Each list keeps the first-seen order and holds every name once. Empty names are skipped.
pub fn extract_dependencies(
    containers: &[Container],
    volumes: &[Volume],
    image_pull_secrets: &[LocalObjectReference],
    volume_claim_templates: &[PersistentVolumeClaim],
) -> Dependencies {
    let mut deps = Dependencies::default();

    for container in containers {
        for source in container.env_from.iter().flatten() {
            if let Some(cm) = &source.config_map_ref {
                push_ref(&mut deps.config_map_refs, cm.name.clone());
            }
            if let Some(secret) = &source.secret_ref {
                push_ref(&mut deps.secret_refs, secret.name.clone());
            }
        }

        let value_sources = container
            .env
            .iter()
            .flatten()
            .filter_map(|var| var.value_from.as_ref());
        for source in value_sources {
            if let Some(key) = &source.config_map_key_ref {
                push_ref(&mut deps.config_map_refs, key.name.clone());
            }
            if let Some(key) = &source.secret_key_ref {
                push_ref(&mut deps.secret_refs, key.name.clone());
            }
        }
    }

    for volume in volumes {
        if let Some(cm) = &volume.config_map {
            push_ref(&mut deps.config_map_refs, cm.name.clone());
        }
        if let Some(secret) = &volume.secret {
            push_ref(&mut deps.secret_refs, secret.secret_name.clone());
        }
        if let Some(claim) = &volume.persistent_volume_claim {
            push_ref(&mut deps.pvc_refs, claim.claim_name.clone());
        }
        let projections = volume
            .projected
            .iter()
            .flat_map(|p| p.sources.iter().flatten());
        for projection in projections {
            if let Some(cm) = &projection.config_map {
                push_ref(&mut deps.config_map_refs, cm.name.clone());
            }
            if let Some(secret) = &projection.secret {
                push_ref(&mut deps.secret_refs, secret.name.clone());
            }
        }
    }

    for pull_secret in image_pull_secrets {
        push_ref(&mut deps.secret_refs, pull_secret.name.clone());
    }

    for template in volume_claim_templates {
        push_ref(&mut deps.pvc_refs, template.metadata.name.clone());
    }

    deps
}

/// Dependencies of a pod spec, init containers included.
pub fn from_pod_spec(
    spec: Option<&PodSpec>,
    volume_claim_templates: &[PersistentVolumeClaim],
) -> Dependencies {
    let Some(spec) = spec else {
        return extract_dependencies(&[], &[], &[], volume_claim_templates);
    };

    let containers: Vec<Container> = spec
        .init_containers
        .iter()
        .flatten()
        .chain(spec.containers.iter())
        .cloned()
        .collect();

    extract_dependencies(
        &containers,
        spec.volumes.as_deref().unwrap_or_default(),
        spec.image_pull_secrets.as_deref().unwrap_or_default(),
        volume_claim_templates,
    )
}

// Reference names are `String` on some API types and `Option<String>` on others
fn push_ref(refs: &mut Vec<String>, name: impl Into<Option<String>>) {
    let Some(name) = name.into().filter(|n| !n.is_empty()) else {
        return;
    };
    if !refs.contains(&name) {
        refs.push(name);
    }
}
