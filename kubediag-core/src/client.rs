//! Kubernetes client handle
//!
//! Wraps the kube-rs Client together with the context it was built from.
//! One handle is constructed at startup and passed into every component.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

use crate::config::ClusterConfig;
use crate::error::{DiagError, DiagResult};

/// Wrapper around kube-rs Client with cluster context
#[derive(Clone)]
pub struct DiagClient {
    inner: Client,
    context: Option<String>,
    cluster_name: Option<String>,
    api_server: String,
}

/// Cluster referenced by the named context
fn cluster_of(kubeconfig: &Kubeconfig, context: &str) -> Option<String> {
    kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context)
        .and_then(|c| c.context.as_ref())
        .map(|c| c.cluster.clone())
}

impl DiagClient {
    /// Connect using the cluster section of the configuration.
    ///
    /// An explicit kubeconfig path wins; otherwise kube-rs resolves
    /// `$KUBECONFIG`, `~/.kube/config` or the in-cluster service account.
    pub async fn connect(config: &ClusterConfig) -> DiagResult<Self> {
        match &config.kubeconfig {
            Some(path) => Self::from_kubeconfig_path(path, config.context.as_deref()).await,
            None => Self::infer(config.context.as_deref()).await,
        }
    }

    /// Create client from a kubeconfig file with optional context
    pub async fn from_kubeconfig_path(path: &Path, context: Option<&str>) -> DiagResult<Self> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            DiagError::InvalidKubeconfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_parsed(kubeconfig, context).await
    }

    /// Create client from kubeconfig YAML with optional context
    pub async fn from_kubeconfig(kubeconfig_yaml: &str, context: Option<&str>) -> DiagResult<Self> {
        let kubeconfig = Kubeconfig::from_yaml(kubeconfig_yaml).map_err(|e| {
            DiagError::InvalidKubeconfig(format!("Failed to parse kubeconfig: {}", e))
        })?;
        Self::from_parsed(kubeconfig, context).await
    }

    async fn from_parsed(kubeconfig: Kubeconfig, context: Option<&str>) -> DiagResult<Self> {
        let context = context
            .map(String::from)
            .or_else(|| kubeconfig.current_context.clone());
        let cluster_name = context.as_deref().and_then(|c| cluster_of(&kubeconfig, c));

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| DiagError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?;

        Self::from_config(config, context, cluster_name)
    }

    /// Use `$KUBECONFIG` or `~/.kube/config`, falling back to in-cluster config
    async fn infer(context: Option<&str>) -> DiagResult<Self> {
        match Kubeconfig::read() {
            Ok(kubeconfig) => Self::from_parsed(kubeconfig, context).await,
            Err(kubeconfig_err) => {
                tracing::debug!("No usable kubeconfig ({}), trying in-cluster", kubeconfig_err);
                let config = Config::incluster().map_err(|e| {
                    DiagError::InvalidKubeconfig(format!(
                        "No kubeconfig ({}) and no in-cluster config ({})",
                        kubeconfig_err, e
                    ))
                })?;
                Self::from_config(config, None, None)
            }
        }
    }

    fn from_config(
        config: Config,
        context: Option<String>,
        cluster_name: Option<String>,
    ) -> DiagResult<Self> {
        let api_server = config.cluster_url.to_string();
        let client = Client::try_from(config)
            .map_err(|e| DiagError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        tracing::debug!(api_server = %api_server, "Kubernetes client created");

        Ok(Self {
            inner: client,
            context,
            cluster_name,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Kubeconfig context the client was built from, if known
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Cluster entry of the active context, if known
    pub fn cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }
}

impl From<Client> for DiagClient {
    fn from(client: Client) -> Self {
        Self {
            inner: client,
            context: None,
            cluster_name: None,
            api_server: String::new(),
        }
    }
}

impl std::fmt::Debug for DiagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagClient")
            .field("context", &self.context)
            .field("cluster_name", &self.cluster_name)
            .field("api_server", &self.api_server)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: prod-ctx
clusters:
- name: prod-cluster
  cluster:
    server: http://127.0.0.1:6443
- name: staging-cluster
  cluster:
    server: http://127.0.0.1:7443
contexts:
- name: prod-ctx
  context:
    cluster: prod-cluster
    user: admin
- name: staging-ctx
  context:
    cluster: staging-cluster
    user: admin
users:
- name: admin
  user:
    token: test-token
"#;

    #[tokio::test]
    async fn test_current_context_resolves_cluster() {
        let client = DiagClient::from_kubeconfig(KUBECONFIG, None).await.unwrap();
        assert_eq!(client.context(), Some("prod-ctx"));
        assert_eq!(client.cluster_name(), Some("prod-cluster"));
        assert!(client.api_server().starts_with("http://127.0.0.1:6443"));
    }

    #[tokio::test]
    async fn test_explicit_context_overrides_current() {
        let client = DiagClient::from_kubeconfig(KUBECONFIG, Some("staging-ctx"))
            .await
            .unwrap();
        assert_eq!(client.context(), Some("staging-ctx"));
        assert_eq!(client.cluster_name(), Some("staging-cluster"));
        assert!(client.api_server().starts_with("http://127.0.0.1:7443"));
    }

    #[tokio::test]
    async fn test_unknown_context_is_rejected() {
        let err = DiagClient::from_kubeconfig(KUBECONFIG, Some("missing-ctx"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiagError::InvalidKubeconfig(_)));
    }

    #[test]
    fn test_cluster_of_unknown_context() {
        let kubeconfig = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        assert_eq!(cluster_of(&kubeconfig, "prod-ctx").as_deref(), Some("prod-cluster"));
        assert_eq!(cluster_of(&kubeconfig, "missing-ctx"), None);
    }
}
