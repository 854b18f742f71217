//! Cluster-level diagnostics
//!
//! Health probes and read-only inventory listings.

pub mod health;
pub mod inventory;
