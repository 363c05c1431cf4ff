// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures: a canned-response API server and domain resource builders.

use crate::types::{ConfigMapInfo, DomainResource, ResourceDetails, ResourceKind};
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock API server answering GET requests by path.
///
/// Paths match exactly first, then by prefix. Unmatched requests get a 404 Status.
/// Every request URI is recorded, query string included.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// URIs requested so far, with percent-encoded `=` and `,` decoded for readability
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|uri| uri.replace("%3D", "=").replace("%2C", ","))
            .collect()
    }

    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        if let Some(resp) = responses.get(path) {
            return Some(resp.clone());
        }

        // Longest prefix wins so /secrets/db does not fall back to /secrets by accident
        responses
            .iter()
            .filter(|(p, _)| path.starts_with(p.as_str()))
            .max_by_key(|(p, _)| p.len())
            .map(|(_, resp)| resp.clone())
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let path = req.uri().path().to_string();
        let uri = req
            .uri()
            .path_and_query()
            .map_or_else(|| path.clone(), |pq| pq.to_string());
        self.requests.lock().unwrap().push(uri);
        let (status, body) = match req.method().as_str() {
            "GET" => self.find_response(&path),
            _ => None,
        }
        .unwrap_or_else(|| (404, not_found_json(&path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

pub fn not_found_json(path: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} not found", path),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

pub fn forbidden_json(resource: &str, namespace: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!(
            "{} is forbidden: User \"system:serviceaccount:dash:viewer\" cannot list resource \"{}\" in namespace \"{}\"",
            resource, resource, namespace
        ),
        "reason": "Forbidden",
        "code": 403
    })
    .to_string()
}

pub fn list_json(kind: &str, api_version: &str, items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "kind": kind,
        "apiVersion": api_version,
        "metadata": {"resourceVersion": "1"},
        "items": items
    })
    .to_string()
}

/// A minimal normalized resource carrying only labels.
pub fn labelled(kind: ResourceKind, name: &str, labels: &[(&str, &str)]) -> DomainResource {
    DomainResource {
        kind,
        name: name.to_string(),
        namespace: "default".to_string(),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        annotations: BTreeMap::new(),
        age: "1d".to_string(),
        dependencies: None,
        details: ResourceDetails::ConfigMap(ConfigMapInfo {
            data: BTreeMap::new(),
        }),
    }
}
