// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{DomainResource, ResourceKind};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelValueCount {
    pub value: String,
    pub count: usize,
}

/// All values seen for one label key, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelGroup {
    pub key: String,
    pub values: Vec<LabelValueCount>,
    /// Sum of the value counts
    pub total_count: usize,
    pub resource_kinds: BTreeSet<ResourceKind>,
}

/// Answer of a label browse: the index of the matching set and the set itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSearchResult {
    pub labels: Vec<LabelGroup>,
    pub resources: Vec<DomainResource>,
    pub total_resources: usize,
}
