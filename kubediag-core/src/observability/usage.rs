//! Resource usage against requests
//!
//! Joins the live pod listing with a metrics snapshot and reports, per
//! container, CPU and memory usage as a percentage of the declared request.

use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::{Api, ListParams};
use kube::ResourceExt;
use std::collections::HashMap;

use super::metrics::{get_all_pod_metrics, ContainerMetrics, PodMetrics};
use crate::client::DiagClient;
use crate::error::DiagResult;
use crate::quantity::{cpu_millis, memory_bytes, usage_percentage};
use crate::types::{ContainerUsage, PodUsage, ResourceUsageReport};

fn request<'a>(container: &'a Container, resource: &str) -> Option<&'a Quantity> {
    container
        .resources
        .as_ref()
        .and_then(|r| r.requests.as_ref())
        .and_then(|r| r.get(resource))
}

/// Usage of one container; a missing quantity counts as zero
pub fn container_usage(container: &Container, metrics: &ContainerMetrics) -> ContainerUsage {
    let millis = |q: Option<&Quantity>| q.map(cpu_millis).unwrap_or(0.0);
    let bytes = |q: Option<&Quantity>| q.map(memory_bytes).unwrap_or(0.0);

    ContainerUsage {
        name: container.name.clone(),
        cpu_usage_percent: usage_percentage(
            millis(metrics.cpu()),
            millis(request(container, "cpu")),
        ),
        memory_usage_percent: usage_percentage(
            bytes(metrics.memory()),
            bytes(request(container, "memory")),
        ),
    }
}

/// Join pods against a metrics snapshot keyed by `namespace/name`.
///
/// Pods come out in listing order. A pod without metrics gets an empty
/// container list, and containers without a metrics entry are skipped.
pub fn build_report(pods: &[Pod], metrics: &[PodMetrics]) -> ResourceUsageReport {
    let by_key: HashMap<String, &PodMetrics> = metrics.iter().map(|m| (m.key(), m)).collect();

    let pods_usage = pods
        .iter()
        .map(|pod| {
            let namespace = pod.namespace().unwrap_or_default();
            let name = pod.name_any();

            let container_usages = match by_key.get(&format!("{}/{}", namespace, name)) {
                Some(pod_metrics) => pod
                    .spec
                    .iter()
                    .flat_map(|spec| spec.containers.iter())
                    .filter_map(|container| {
                        pod_metrics
                            .container(&container.name)
                            .map(|m| container_usage(container, m))
                    })
                    .collect(),
                None => {
                    tracing::info!("No metrics available for pod: {}/{}", namespace, name);
                    Vec::new()
                }
            };

            PodUsage {
                pod_name: name,
                namespace,
                container_usages,
            }
        })
        .collect();

    ResourceUsageReport { pods_usage }
}

/// Usage report over every pod in every namespace
pub async fn resource_usage_report(client: &DiagClient) -> DiagResult<ResourceUsageReport> {
    let pods: Api<Pod> = Api::all(client.inner().clone());
    let pods = pods.list(&ListParams::default()).await?;
    let metrics = get_all_pod_metrics(client).await?;

    Ok(build_report(&pods.items, &metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::ResourceRequirements;
    use std::collections::BTreeMap;

    fn quantities(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
        BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
        ])
    }

    #[test]
    fn test_container_usage_percentages() {
        let container = Container {
            name: "app".to_string(),
            resources: Some(ResourceRequirements {
                requests: Some(quantities("200m", "256Mi")),
                ..Default::default()
            }),
            ..Default::default()
        };
        let metrics = ContainerMetrics {
            name: "app".to_string(),
            usage: quantities("50m", "64Mi"),
        };

        let usage = container_usage(&container, &metrics);
        assert!((usage.cpu_usage_percent - 25.0).abs() < 1e-9);
        assert!((usage.memory_usage_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_without_requests_is_zero() {
        let container = Container {
            name: "app".to_string(),
            ..Default::default()
        };
        let metrics = ContainerMetrics {
            name: "app".to_string(),
            usage: quantities("900m", "1Gi"),
        };

        let usage = container_usage(&container, &metrics);
        assert_eq!(usage.cpu_usage_percent, 0.0);
        assert_eq!(usage.memory_usage_percent, 0.0);
    }
}
