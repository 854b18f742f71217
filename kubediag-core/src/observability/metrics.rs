//! Metrics from metrics-server
//!
//! Point-in-time pod metrics snapshot from `metrics.k8s.io/v1beta1`.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::client::DiagClient;
use crate::error::{DiagError, DiagResult};

const POD_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";

/// Usage of one container at the sampled instant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

impl ContainerMetrics {
    pub fn cpu(&self) -> Option<&Quantity> {
        self.usage.get("cpu")
    }

    pub fn memory(&self) -> Option<&Quantity> {
        self.usage.get("memory")
    }
}

/// Metrics of one pod
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodMetrics {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

impl PodMetrics {
    /// `namespace/name` index key
    pub fn key(&self) -> String {
        format!(
            "{}/{}",
            self.metadata.namespace.as_deref().unwrap_or_default(),
            self.metadata.name.as_deref().unwrap_or_default()
        )
    }

    /// Container entry matched by name
    pub fn container(&self, name: &str) -> Option<&ContainerMetrics> {
        self.containers.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct PodMetricsList {
    #[serde(default)]
    items: Vec<PodMetrics>,
}

/// Get all pod metrics across all namespaces
pub async fn get_all_pod_metrics(client: &DiagClient) -> DiagResult<Vec<PodMetrics>> {
    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri(POD_METRICS_PATH)
        .body(vec![])
        .map_err(|e| DiagError::Internal(e.to_string()))?;

    let list: PodMetricsList = client.inner().request(request).await?;

    tracing::debug!(pods = list.items.len(), "Fetched pod metrics snapshot");

    Ok(list.items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_metrics_decode() {
        let list: PodMetricsList = serde_json::from_str(
            r#"{
                "kind": "PodMetricsList",
                "apiVersion": "metrics.k8s.io/v1beta1",
                "metadata": {},
                "items": [{
                    "metadata": {"name": "web-0", "namespace": "shop"},
                    "timestamp": "2024-05-01T10:00:00Z",
                    "window": "15s",
                    "containers": [
                        {"name": "app", "usage": {"cpu": "125m", "memory": "64Mi"}},
                        {"name": "sidecar", "usage": {"cpu": "1500000n", "memory": "12Mi"}}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let pod = &list.items[0];
        assert_eq!(pod.key(), "shop/web-0");
        assert_eq!(pod.window.as_deref(), Some("15s"));
        let app = pod.container("app").unwrap();
        assert_eq!(app.cpu().map(|q| q.0.as_str()), Some("125m"));
        assert_eq!(app.memory().map(|q| q.0.as_str()), Some("64Mi"));
        assert!(pod.container("missing").is_none());
    }
}
