//! Redis cluster status
//!
//! Reads the status document the data-store controller writes into its
//! custom resource, decodes it into [`ClusterReport`] and joins every node
//! against its live pod for scheduling and request details.

use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind};
use std::collections::{BTreeMap, BTreeSet};

use crate::client::DiagClient;
use crate::config::{CustomResourceConfig, RedisConfig};
use crate::error::{DiagError, DiagResult};
use crate::types::{
    ClusterReport, EnrichmentFailure, PodDetails, RedisNode, RedisRole, RedisStatus,
};

/// Controller state meaning the cluster is healthy
pub const CLUSTER_STATE_OK: &str = "OK";

fn api_resource(resource: &CustomResourceConfig) -> ApiResource {
    let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
    ApiResource::from_gvk_with_plural(&gvk, &resource.plural)
}

/// Decode the `status` sub-document of the custom resource
pub fn decode_status(object: &DynamicObject) -> DiagResult<ClusterReport> {
    let status = object
        .data
        .get("status")
        .filter(|s| !s.is_null())
        .ok_or_else(|| DiagError::decode("custom resource", "missing `status` field"))?;

    if !status.is_object() {
        return Err(DiagError::decode(
            "custom resource status",
            "`status` is not an object",
        ));
    }

    serde_json::from_value(status.clone())
        .map_err(|e| DiagError::decode("custom resource status", e))
}

/// Number of distinct zones across all nodes
pub fn count_active_zones(nodes: &[RedisNode]) -> usize {
    nodes
        .iter()
        .map(|n| n.zone.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Primaries per zone, keyed by zone
pub fn primaries_by_zone(nodes: &[RedisNode]) -> BTreeMap<&str, usize> {
    let mut zones = BTreeMap::new();
    for node in nodes.iter().filter(|n| n.role == RedisRole::Primary) {
        *zones.entry(node.zone.as_str()).or_insert(0) += 1;
    }
    zones
}

/// Scheduling details of a pod; requests come from its first container
pub fn pod_details(pod: &Pod) -> PodDetails {
    let spec = pod.spec.as_ref();
    let requests = spec
        .and_then(|s| s.containers.first())
        .and_then(|c| c.resources.as_ref())
        .and_then(|r| r.requests.as_ref());

    let request = |name: &str| {
        requests
            .and_then(|r| r.get(name))
            .map(|q| q.0.clone())
            .unwrap_or_else(|| "0".to_string())
    };

    PodDetails {
        worker: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        cpu: request("cpu"),
        memory: request("memory"),
    }
}

/// Pod details keyed by pod name plus the nodes that could not be joined
#[derive(Debug, Default)]
pub struct Enrichment {
    pub details: BTreeMap<String, PodDetails>,
    pub failures: Vec<EnrichmentFailure>,
}

impl Enrichment {
    /// Record the outcome of one pod lookup.
    ///
    /// A failed lookup still gets a zero-valued entry so every node has one.
    pub fn record(&mut self, pod_name: &str, lookup: DiagResult<Pod>) {
        match lookup {
            Ok(pod) => {
                self.details.insert(pod_name.to_string(), pod_details(&pod));
            }
            Err(e) => {
                tracing::warn!(pod = pod_name, "Failed to fetch redis pod: {}", e);
                self.details
                    .insert(pod_name.to_string(), PodDetails::default());
                self.failures.push(EnrichmentFailure {
                    pod_name: pod_name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Combine a decoded report with pod enrichment
pub fn summarize(report: ClusterReport, enrichment: Enrichment) -> RedisStatus {
    let cluster = &report.cluster;
    let by_zone = primaries_by_zone(&cluster.nodes);

    RedisStatus {
        primaries_configured: cluster.number_of_primaries,
        replicas_configured: cluster.max_replication_factor,
        pod_status_ok: cluster.number_of_pods == cluster.number_of_pods_ready,
        cluster_state_ok: cluster.status == CLUSTER_STATE_OK,
        known_nodes: cluster.nodes.len(),
        cluster_size: cluster.number_of_pods,
        active_zones: count_active_zones(&cluster.nodes),
        zones_with_primaries: by_zone.len(),
        max_primaries_in_zone: by_zone.values().copied().max().unwrap_or(0),
        pod_details: enrichment.details,
        enrichment_failures: enrichment.failures,
        report,
    }
}

/// Fetch the custom resource and decode its status
pub async fn fetch_report(client: &DiagClient, config: &RedisConfig) -> DiagResult<ClusterReport> {
    let resource = &config.resource;
    let api: Api<DynamicObject> = Api::namespaced_with(
        client.inner().clone(),
        &config.namespace,
        &api_resource(resource),
    );

    let object = api.get(&resource.name).await?;
    decode_status(&object)
}

/// Resolve the enriched status of the data-store cluster
pub async fn resolve(client: &DiagClient, config: &RedisConfig) -> DiagResult<RedisStatus> {
    let report = fetch_report(client, config).await?;

    let pods: Api<Pod> = Api::namespaced(client.inner().clone(), &config.namespace);
    let mut enrichment = Enrichment::default();
    for node in &report.cluster.nodes {
        let lookup = pods.get(&node.pod_name).await.map_err(DiagError::from);
        enrichment.record(&node.pod_name, lookup);
    }

    if !enrichment.failures.is_empty() {
        tracing::warn!(
            failed = enrichment.failures.len(),
            nodes = report.cluster.nodes.len(),
            "Some redis pods could not be joined"
        );
    }

    Ok(summarize(report, enrichment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_resource_coordinates() {
        let ar = api_resource(&CustomResourceConfig::default());
        assert_eq!(ar.group, "db.ibm.com");
        assert_eq!(ar.version, "v1alpha1");
        assert_eq!(ar.api_version, "db.ibm.com/v1alpha1");
        assert_eq!(ar.plural, "redisclusters");
    }

    #[test]
    fn test_pod_without_requests() {
        let details = pod_details(&Pod::default());
        assert_eq!(details.worker, "");
        assert_eq!(details.cpu, "0");
        assert_eq!(details.memory, "0");
    }
}
