//! kubediag core library
//!
//! Operational diagnostics for a Kubernetes cluster:
//! - Health probes over nodes, pods and events
//! - Resource usage relative to requests
//! - Redis cluster status from its custom resource
//! - Alertmanager alerts and remote commands over the exec channel

// Core modules
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub mod quantity;

// Sub-modules for the diagnostic read paths
pub mod cluster;
pub mod exec;
pub mod observability;
pub mod redis;
pub mod trace;

pub use client::DiagClient;
pub use config::DiagConfig;
pub use error::{DiagError, DiagResult};
pub use exec::{CommandExecutor, ExecOutput, PodExecutor};
