//! Configuration management for kubediag
//!
//! Settings are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)
//!
//! The resolved [`DiagConfig`] is passed explicitly into every component.

use crate::error::{DiagError, DiagResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct for kubediag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagConfig {
    /// Cluster connection settings
    pub cluster: ClusterConfig,
    /// Exec channel settings
    pub exec: ExecConfig,
    /// Health probe settings
    pub health: HealthConfig,
    /// Redis cluster location and custom resource coordinates
    pub redis: RedisConfig,
    /// Alertmanager location
    pub alerts: AlertsConfig,
    /// Remote trace-level endpoint
    pub trace: TraceConfig,
    /// Service looked up for its load-balancer address
    pub services: ServicesConfig,
    /// Logging configuration
    pub logging: LogSettings,
}

/// Cluster connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Kubeconfig path; falls back to the kube-rs default resolution
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of current-context
    pub context: Option<String>,
}

/// Exec channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Deadline for a single remote command
    pub timeout_secs: u64,
}

impl ExecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Health probe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Do not count pods in the `Succeeded` phase as not running
    pub ignore_succeeded_pods: bool,
}

/// Redis cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub namespace: String,
    /// Container running redis-cli in every data-store pod
    pub container: String,
    pub service_port: u16,
    pub resource: CustomResourceConfig,
}

impl RedisConfig {
    /// In-cluster address of the data-store service
    pub fn service_address(&self) -> String {
        format!(
            "redis-cluster.{}.svc.cluster.local:{}",
            self.namespace, self.service_port
        )
    }
}

/// Coordinates of the custom resource written by the data-store controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomResourceConfig {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub name: String,
}

/// Alertmanager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    /// Alertmanager URL as seen from inside the container
    pub alertmanager_url: String,
}

/// Trace-level endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Local port of the trace endpoint inside the target container
    pub port: u16,
}

/// Service address lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub namespace: String,
    pub name: String,
}

/// Logging settings as stored in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub file_path: Option<String>,
    pub json_format: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            namespace: "fed-redis-cluster".to_string(),
            container: "redis-node".to_string(),
            service_port: 6379,
            resource: CustomResourceConfig::default(),
        }
    }
}

impl Default for CustomResourceConfig {
    fn default() -> Self {
        Self {
            group: "db.ibm.com".to_string(),
            version: "v1alpha1".to_string(),
            kind: "RedisCluster".to_string(),
            plural: "redisclusters".to_string(),
            name: "node-for-redis".to_string(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            namespace: "fed-prometheus".to_string(),
            pod: "alertmanager-prometheus-alerts-0".to_string(),
            container: "alertmanager".to_string(),
            alertmanager_url: "http://localhost:9093".to_string(),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            namespace: "fed-paas-helpers".to_string(),
            name: "kargo".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl DiagConfig {
    /// Load configuration from file and environment
    pub fn load() -> DiagResult<Self> {
        Self::load_from(Self::find_config_file().as_deref())
    }

    /// Load configuration from an explicit file (if any) and environment
    pub fn load_from(path: Option<&Path>) -> DiagResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> DiagResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiagError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| DiagError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// `$KUBEDIAG_CONFIG`, else `~/.config/kubediag/config.toml` if it exists
    pub fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("KUBEDIAG_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let home = std::env::var("HOME").ok()?;
        let path = PathBuf::from(home).join(".config/kubediag/config.toml");
        path.exists().then_some(path)
    }

    fn apply_env_overrides(&mut self) -> DiagResult<()> {
        if let Ok(path) = std::env::var("KUBEDIAG_KUBECONFIG") {
            self.cluster.kubeconfig = Some(PathBuf::from(path));
        }
        if let Ok(context) = std::env::var("KUBEDIAG_CONTEXT") {
            self.cluster.context = Some(context);
        }
        if let Ok(timeout) = std::env::var("KUBEDIAG_EXEC_TIMEOUT_SECS") {
            self.exec.timeout_secs = parse_secs_env("KUBEDIAG_EXEC_TIMEOUT_SECS", &timeout)?;
        }
        if let Ok(ignore) = std::env::var("KUBEDIAG_IGNORE_SUCCEEDED_PODS") {
            self.health.ignore_succeeded_pods =
                parse_bool_env("KUBEDIAG_IGNORE_SUCCEEDED_PODS", &ignore)?;
        }
        if let Ok(ns) = std::env::var("KUBEDIAG_REDIS_NAMESPACE") {
            self.redis.namespace = ns;
        }
        if let Ok(url) = std::env::var("KUBEDIAG_ALERTMANAGER_URL") {
            self.alerts.alertmanager_url = url;
        }
        if let Ok(level) = std::env::var("KUBEDIAG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(path) = std::env::var("KUBEDIAG_LOG_PATH") {
            self.logging.file_path = Some(path);
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> DiagResult<()> {
        if self.exec.timeout_secs == 0 {
            return Err(DiagError::Config(
                "exec.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let required = [
            ("redis.namespace", &self.redis.namespace),
            ("redis.container", &self.redis.container),
            ("redis.resource.name", &self.redis.resource.name),
            ("alerts.namespace", &self.alerts.namespace),
            ("alerts.pod", &self.alerts.pod),
            ("alerts.container", &self.alerts.container),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(DiagError::Config(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn parse_secs_env(key: &str, value: &str) -> DiagResult<u64> {
    value.trim().parse().map_err(|_| {
        DiagError::Config(format!("{} must be a whole number of seconds, got {:?}", key, value))
    })
}

fn parse_bool_env(key: &str, value: &str) -> DiagResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(DiagError::Config(format!(
            "{} must be true or false, got {:?}",
            key, value
        ))),
    }
}
