//! Read-only cluster inventory
//!
//! Thin listings over the control plane. Name listings degrade to an empty
//! list (with a warning) when the API call fails.

use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use kube::api::{Api, ListParams};
use kube::discovery::{Discovery, Scope};
use kube::ResourceExt;

use crate::client::DiagClient;
use crate::error::DiagResult;
use crate::types::{ApiResourceInfo, NodeRoleCounts, ServerVersion};

/// Label marking control-plane nodes
pub const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";

/// Get Kubernetes version information
pub async fn server_version(client: &DiagClient) -> DiagResult<ServerVersion> {
    let version = client.inner().apiserver_version().await?;

    Ok(ServerVersion {
        server: format!("{}.{}", version.major, version.minor),
        git_version: version.git_version,
        platform: version.platform,
    })
}

/// Names of all nodes
pub async fn node_names(client: &DiagClient) -> Vec<String> {
    let nodes: Api<Node> = Api::all(client.inner().clone());

    match nodes.list(&ListParams::default()).await {
        Ok(list) => list.items.iter().map(|n| n.name_any()).collect(),
        Err(e) => {
            tracing::warn!("Failed to list nodes: {}", e);
            Vec::new()
        }
    }
}

/// Split nodes into control-plane and worker counts
pub fn count_node_roles(nodes: &[Node]) -> NodeRoleCounts {
    let control_plane = nodes
        .iter()
        .filter(|n| n.labels().contains_key(CONTROL_PLANE_LABEL))
        .count();

    NodeRoleCounts {
        control_plane,
        workers: nodes.len() - control_plane,
    }
}

/// Control-plane and worker node counts
pub async fn node_roles(client: &DiagClient) -> NodeRoleCounts {
    let nodes: Api<Node> = Api::all(client.inner().clone());

    match nodes.list(&ListParams::default()).await {
        Ok(list) => count_node_roles(&list.items),
        Err(e) => {
            tracing::warn!("Failed to list nodes: {}", e);
            NodeRoleCounts::default()
        }
    }
}

/// Names of all namespaces
pub async fn namespace_names(client: &DiagClient) -> Vec<String> {
    let namespaces: Api<Namespace> = Api::all(client.inner().clone());

    match namespaces.list(&ListParams::default()).await {
        Ok(list) => list.items.iter().map(|ns| ns.name_any()).collect(),
        Err(e) => {
            tracing::warn!("Failed to list namespaces: {}", e);
            Vec::new()
        }
    }
}

/// Names of the pods in a namespace
pub async fn pod_names(client: &DiagClient, namespace: &str) -> Vec<String> {
    let pods: Api<Pod> = Api::namespaced(client.inner().clone(), namespace);

    match pods.list(&ListParams::default()).await {
        Ok(list) => list.items.iter().map(|p| p.name_any()).collect(),
        Err(e) => {
            tracing::warn!(namespace, "Failed to list pods: {}", e);
            Vec::new()
        }
    }
}

/// Container names of the first pod called `pod` in any namespace
pub async fn container_names(client: &DiagClient, pod: &str) -> Vec<String> {
    let pods: Api<Pod> = Api::all(client.inner().clone());
    let params = ListParams::default().fields(&format!("metadata.name={}", pod));

    match pods.list(&params).await {
        Ok(list) => list
            .items
            .first()
            .and_then(|p| p.spec.as_ref())
            .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!(pod, "Failed to look up pod: {}", e);
            Vec::new()
        }
    }
}

/// Load-balancer address of a service: the ingress IP, else its hostname.
/// `None` while no ingress is assigned.
pub async fn load_balancer_ip(
    client: &DiagClient,
    namespace: &str,
    name: &str,
) -> DiagResult<Option<String>> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    let service = services.get(name).await?;

    let address = service
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .and_then(|ingress| ingress.into_iter().next())
        .and_then(|ingress| ingress.ip.or(ingress.hostname));

    if address.is_none() {
        tracing::info!(namespace, name, "No load balancer ingress assigned");
    }

    Ok(address)
}

/// Every API resource the server advertises
pub async fn api_resources(client: &DiagClient) -> DiagResult<Vec<ApiResourceInfo>> {
    let discovery = Discovery::new(client.inner().clone()).run().await?;

    let mut resources = Vec::new();
    for group in discovery.groups() {
        for (resource, caps) in group.recommended_resources() {
            resources.push(ApiResourceInfo {
                group_version: resource.api_version.clone(),
                name: resource.plural.clone(),
                kind: resource.kind.clone(),
                namespaced: matches!(caps.scope, Scope::Namespaced),
                verbs: caps.operations.clone(),
            });
        }
    }

    Ok(resources)
}
