//! Diagnostic value types
//!
//! Reports are rebuilt on every call and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verdict of a single health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStatus {
    pub passed: bool,
    /// Human-readable explanation; empty when the listing could not be fetched
    pub detail: String,
    /// Listing-fetch failure, if any
    pub error: Option<String>,
}

impl TestStatus {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn errored(error: impl std::fmt::Display) -> Self {
        Self {
            passed: false,
            detail: String::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Verdicts of all health probes
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub nodes: TestStatus,
    pub pods: TestStatus,
    pub events: TestStatus,
}

impl HealthReport {
    pub fn all_passed(&self) -> bool {
        self.nodes.passed && self.pods.passed && self.events.passed
    }

    /// Probe name paired with its verdict, in execution order
    pub fn verdicts(&self) -> [(&'static str, &TestStatus); 3] {
        [
            ("nodes", &self.nodes),
            ("pods", &self.pods),
            ("events", &self.events),
        ]
    }
}

/// Alert flattened from an alertmanager record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub name: String,
    pub severity: String,
    pub starts_at: String,
    pub pod_name: String,
    pub summary: String,
}

/// Alert record as printed by `amtool -o json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAlert {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
}

impl From<RawAlert> for Alert {
    fn from(mut raw: RawAlert) -> Self {
        let mut label = |key: &str| raw.labels.remove(key).unwrap_or_default();
        Self {
            name: label("alertname"),
            severity: label("severity"),
            pod_name: label("pod"),
            starts_at: raw.starts_at,
            summary: raw.annotations.remove("summary").unwrap_or_default(),
        }
    }
}

/// Role of a data-store member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedisRole {
    Primary,
    Replica,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RedisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "Primary"),
            Self::Replica => write!(f, "Replica"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One member of the data-store cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisNode {
    pub id: String,
    pub ip: String,
    pub pod_name: String,
    pub port: String,
    pub role: RedisRole,
    #[serde(default, skip_serializing_if = "no_slots")]
    pub slots: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "no_primary_ref")]
    pub primary_ref: Option<String>,
    pub zone: String,
}

fn no_slots(slots: &Option<Vec<String>>) -> bool {
    slots.as_ref().map_or(true, Vec::is_empty)
}

fn no_primary_ref(primary_ref: &Option<String>) -> bool {
    primary_ref.as_deref().map_or(true, str::is_empty)
}

/// Cluster section of the custom resource status
///
/// The controller omits zero counters, so they default to 0. `status`
/// stays required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisClusterInfo {
    #[serde(default)]
    pub label_selector_path: String,
    #[serde(default)]
    pub max_replication_factor: i64,
    #[serde(default)]
    pub min_replication_factor: i64,
    #[serde(default)]
    pub nodes: Vec<RedisNode>,
    #[serde(default)]
    pub number_of_pods: i64,
    #[serde(default)]
    pub number_of_pods_ready: i64,
    #[serde(default)]
    pub number_of_primaries: i64,
    #[serde(default)]
    pub number_of_primaries_ready: i64,
    #[serde(default)]
    pub number_of_redis_nodes_running: i64,
    #[serde(default)]
    pub number_of_replicas_per_primary: BTreeMap<String, i64>,
    pub status: String,
}

/// Condition reported by the data-store controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCondition {
    #[serde(default)]
    pub last_probe_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_transition_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    pub status: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Status sub-document of the data-store custom resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
    pub cluster: RedisClusterInfo,
    #[serde(default)]
    pub conditions: Vec<ClusterCondition>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// Scheduling and request details recovered from a live pod
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PodDetails {
    pub worker: String,
    pub cpu: String,
    pub memory: String,
}

/// A node whose pod could not be joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentFailure {
    pub pod_name: String,
    pub reason: String,
}

/// Data-store report enriched with live pod details
#[derive(Debug, Clone, Serialize)]
pub struct RedisStatus {
    pub primaries_configured: i64,
    pub replicas_configured: i64,
    /// All pods reported ready
    pub pod_status_ok: bool,
    /// Controller reports cluster state `OK`
    pub cluster_state_ok: bool,
    pub known_nodes: usize,
    pub cluster_size: i64,
    pub active_zones: usize,
    pub zones_with_primaries: usize,
    pub max_primaries_in_zone: usize,
    pub report: ClusterReport,
    /// Keyed by pod name; zero-valued for pods that could not be fetched
    pub pod_details: BTreeMap<String, PodDetails>,
    pub enrichment_failures: Vec<EnrichmentFailure>,
}

impl RedisStatus {
    pub fn nodes(&self) -> &[RedisNode] {
        &self.report.cluster.nodes
    }
}

/// Output of one store-wide redis-cli call, per pod
#[derive(Debug, Clone, Serialize)]
pub struct RedisCommandOutput {
    pub pod_name: String,
    pub output: String,
}

/// Per-container usage relative to its requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodUsage {
    pub pod_name: String,
    pub namespace: String,
    pub container_usages: Vec<ContainerUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceUsageReport {
    pub pods_usage: Vec<PodUsage>,
}

/// Node counts by role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeRoleCounts {
    pub control_plane: usize,
    pub workers: usize,
}

/// Kubernetes version information
#[derive(Debug, Clone, Serialize)]
pub struct ServerVersion {
    pub server: String,
    pub git_version: String,
    pub platform: String,
}

/// API resource advertised by discovery
#[derive(Debug, Clone, Serialize)]
pub struct ApiResourceInfo {
    pub group_version: String,
    pub name: String,
    pub kind: String,
    pub namespaced: bool,
    pub verbs: Vec<String>,
}
