// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label index and selector search over normalized resources.

pub mod index;
pub mod selector;

pub use index::build_index;
pub use selector::{search, Selector, Term};

use crate::error::Result;
use crate::types::{DomainResource, LabelSearchResult};
use tracing::debug;

/// Filter `resources` by `selector`, then index the matching set.
pub fn browse_labels(resources: Vec<DomainResource>, selector: &str) -> Result<LabelSearchResult> {
    let selector: Selector = selector.parse()?;
    let scanned = resources.len();

    let resources: Vec<DomainResource> = resources
        .into_iter()
        .filter(|r| selector.matches(&r.labels))
        .collect();
    let labels = build_index(&resources);

    debug!(
        selector = %selector,
        scanned,
        matched = resources.len(),
        label_keys = labels.len(),
        "Browsed labels"
    );

    Ok(LabelSearchResult {
        labels,
        total_resources: resources.len(),
        resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::labelled;
    use crate::types::ResourceKind;

    #[test]
    fn test_index_is_built_over_filtered_set() {
        let resources = vec![
            labelled(ResourceKind::Deployment, "web", &[("app", "web"), ("env", "prod")]),
            labelled(ResourceKind::Pod, "web-1", &[("app", "web"), ("env", "prod")]),
            labelled(ResourceKind::Pod, "batch-1", &[("app", "batch"), ("env", "dev")]),
        ];

        let result = browse_labels(resources, "env=prod").unwrap();

        assert_eq!(result.total_resources, 2);
        assert_eq!(result.resources.len(), 2);
        let app = result.labels.iter().find(|g| g.key == "app").unwrap();
        assert_eq!(app.values.len(), 1);
        assert_eq!(app.values[0].value, "web");
        assert_eq!(app.total_count, 2);
    }

    #[test]
    fn test_empty_selector_indexes_everything() {
        let resources = vec![
            labelled(ResourceKind::Service, "a", &[("app", "a")]),
            labelled(ResourceKind::Secret, "b", &[]),
        ];

        let result = browse_labels(resources, "").unwrap();
        assert_eq!(result.total_resources, 2);
        assert_eq!(result.labels.len(), 1);
    }

    #[test]
    fn test_malformed_selector_is_rejected() {
        assert!(browse_labels(Vec::new(), "app=,=").is_err());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let resources = vec![labelled(ResourceKind::Pod, "p", &[("app", "x")])];
        let json = serde_json::to_value(browse_labels(resources, "app").unwrap()).unwrap();

        assert_eq!(json["totalResources"], 1);
        assert_eq!(json["labels"][0]["totalCount"], 1);
        assert_eq!(json["labels"][0]["resourceKinds"][0], "Pod");
    }
}
