// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::{DomainResource, LabelGroup, LabelValueCount, ResourceKind};
use std::collections::{BTreeSet, HashMap};

#[derive(Default)]
struct ValueTally {
    count: usize,
    kinds: BTreeSet<ResourceKind>,
}

/// Build the inverted label index of a batch: key, then value, then count and kinds.
///
/// Values are ordered by count descending then by value. Groups are ordered by total
/// count descending then by key.
pub fn build_index(resources: &[DomainResource]) -> Vec<LabelGroup> {
    let mut tallies: HashMap<&str, HashMap<&str, ValueTally>> = HashMap::new();

    for resource in resources {
        for (key, value) in &resource.labels {
            let tally = tallies
                .entry(key.as_str())
                .or_default()
                .entry(value.as_str())
                .or_default();
            tally.count += 1;
            tally.kinds.insert(resource.kind);
        }
    }

    let mut groups: Vec<LabelGroup> = tallies
        .into_iter()
        .map(|(key, values)| {
            let mut resource_kinds = BTreeSet::new();
            let mut values: Vec<LabelValueCount> = values
                .into_iter()
                .map(|(value, tally)| {
                    resource_kinds.extend(tally.kinds);
                    LabelValueCount {
                        value: value.to_string(),
                        count: tally.count,
                    }
                })
                .collect();
            values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

            LabelGroup {
                key: key.to_string(),
                total_count: values.iter().map(|v| v.count).sum(),
                values,
                resource_kinds,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}
