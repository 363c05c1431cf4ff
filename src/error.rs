// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Cluster context '{context}' cannot be used: {reason}")]
    Configuration { context: String, reason: String },

    #[error("Permission denied listing {kind} in namespace '{namespace}'")]
    PermissionDenied { kind: ResourceKind, namespace: String },

    #[error("Cluster for context '{context}' is unavailable: {reason}")]
    UpstreamUnavailable { context: String, reason: String },

    #[error("Malformed selector '{selector}': {reason}")]
    MalformedSelector { selector: String, reason: String },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl DeckError {
    pub(crate) fn configuration(context: impl Into<String>, reason: impl ToString) -> Self {
        DeckError::Configuration {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(selector: &str, reason: impl Into<String>) -> Self {
        DeckError::MalformedSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify an error returned by the API server for a call made on behalf of `kind`.
    pub(crate) fn from_api(
        err: kube::Error,
        context: &str,
        kind: ResourceKind,
        namespace: &str,
    ) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 403 => DeckError::PermissionDenied {
                kind,
                namespace: namespace.to_string(),
            },
            other => DeckError::upstream(other, context),
        }
    }

    /// Keep API statuses as they are; anything below the API layer means the cluster is unreachable.
    pub(crate) fn upstream(err: kube::Error, context: &str) -> Self {
        match err {
            kube::Error::Api(_) => DeckError::Kube(err),
            other => DeckError::UpstreamUnavailable {
                context: context.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, DeckError::PermissionDenied { .. })
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
