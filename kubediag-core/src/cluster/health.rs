//! Cluster health checks
//!
//! Three independent probes over node, pod and event listings. Each probe
//! fetches its listing and hands it to a pure `evaluate_*` function.

use k8s_openapi::api::core::v1::{Event, Node, Pod};
use kube::api::{Api, ListParams};

use crate::client::DiagClient;
use crate::config::HealthConfig;
use crate::types::{HealthReport, TestStatus};

/// Fail on the first node whose `Ready` condition is not `True`
pub fn evaluate_nodes(nodes: &[Node]) -> TestStatus {
    for node in nodes {
        let conditions = node
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_deref())
            .unwrap_or_default();

        let not_ready = conditions
            .iter()
            .any(|c| c.type_ == "Ready" && c.status != "True");

        if not_ready {
            let name = node.metadata.name.as_deref().unwrap_or("<unnamed>");
            return TestStatus::fail(format!("Node {} is not ready", name));
        }
    }

    TestStatus::pass("All nodes are ready")
}

/// Number of pods the phase probe counts as not running
pub fn count_not_running(pods: &[Pod], config: &HealthConfig) -> usize {
    pods.iter()
        .filter(|pod| {
            let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
            match phase {
                Some("Running") => false,
                Some("Succeeded") if config.ignore_succeeded_pods => false,
                _ => true,
            }
        })
        .count()
}

/// Fail when any pod is outside the `Running` phase
pub fn evaluate_pods(pods: &[Pod], config: &HealthConfig) -> TestStatus {
    match count_not_running(pods, config) {
        0 => TestStatus::pass("All pods are running"),
        n => TestStatus::fail(format!("{} pods are in not running state", n)),
    }
}

/// Fail when any `Warning` or `Error` event exists
pub fn evaluate_events(events: &[Event]) -> TestStatus {
    let mut warnings = 0;
    let mut errors = 0;

    for event in events {
        match event.type_.as_deref() {
            Some("Warning") => warnings += 1,
            Some("Error") => errors += 1,
            _ => {}
        }
    }

    if warnings > 0 || errors > 0 {
        TestStatus::fail(format!(
            "{} warning events and {} error events found",
            warnings, errors
        ))
    } else {
        TestStatus::pass("No failed events found")
    }
}

/// Check that every node is ready
pub async fn check_nodes(client: &DiagClient) -> TestStatus {
    let nodes: Api<Node> = Api::all(client.inner().clone());

    match nodes.list(&ListParams::default()).await {
        Ok(list) => evaluate_nodes(&list.items),
        Err(e) => {
            tracing::warn!("Failed to list nodes: {}", e);
            TestStatus::errored(e)
        }
    }
}

/// Check that every pod in every namespace is running
pub async fn check_pods(client: &DiagClient, config: &HealthConfig) -> TestStatus {
    let pods: Api<Pod> = Api::all(client.inner().clone());

    match pods.list(&ListParams::default()).await {
        Ok(list) => evaluate_pods(&list.items, config),
        Err(e) => {
            tracing::warn!("Failed to list pods: {}", e);
            TestStatus::errored(e)
        }
    }
}

/// Check for warning and error events in every namespace
pub async fn check_events(client: &DiagClient) -> TestStatus {
    let events: Api<Event> = Api::all(client.inner().clone());

    match events.list(&ListParams::default()).await {
        Ok(list) => evaluate_events(&list.items),
        Err(e) => {
            tracing::warn!("Failed to list events: {}", e);
            TestStatus::errored(e)
        }
    }
}

/// Run all probes one after another
pub async fn run_all(client: &DiagClient, config: &HealthConfig) -> HealthReport {
    let report = HealthReport {
        nodes: check_nodes(client).await,
        pods: check_pods(client, config).await,
        events: check_events(client).await,
    };

    tracing::info!(passed = report.all_passed(), "Health checks complete");

    report
}
