// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace policy objects: resource quotas and limit ranges.

use super::{text, Normalize, Normalizer};
use crate::types::{LimitInfo, LimitRangeInfo, QuotaInfo, ResourceDetails, ResourceKind};
use k8s_openapi::api::core::v1::{LimitRange, LimitRangeItem, ResourceQuota};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

fn quantities(map: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, String> {
    map.iter()
        .flat_map(|m| m.iter())
        .map(|(k, q)| (k.clone(), q.0.clone()))
        .collect()
}

/// Absent and empty bounds are both left out.
fn bound(map: Option<&BTreeMap<String, Quantity>>) -> Option<BTreeMap<String, String>> {
    Some(quantities(map)).filter(|m| !m.is_empty())
}

impl Normalize for ResourceQuota {
    const KIND: ResourceKind = ResourceKind::ResourceQuota;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let status = self.status.as_ref();
        ResourceDetails::ResourceQuota(QuotaInfo {
            hard: quantities(status.and_then(|s| s.hard.as_ref())),
            used: quantities(status.and_then(|s| s.used.as_ref())),
        })
    }
}

fn limit_info(item: &LimitRangeItem) -> LimitInfo {
    LimitInfo {
        limit_type: Some(text(item.type_.clone()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Container".to_string()),
        max: bound(item.max.as_ref()),
        min: bound(item.min.as_ref()),
        default: bound(item.default.as_ref()),
        default_request: bound(item.default_request.as_ref()),
        max_limit_request_ratio: bound(item.max_limit_request_ratio.as_ref()),
    }
}

impl Normalize for LimitRange {
    const KIND: ResourceKind = ResourceKind::LimitRange;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        ResourceDetails::LimitRange(LimitRangeInfo {
            limits: self
                .spec
                .iter()
                .flat_map(|s| s.limits.iter())
                .map(limit_info)
                .collect(),
        })
    }
}
