//! Observability: metrics snapshot, resource usage and alerts

pub mod alerts;
pub mod metrics;
pub mod usage;

pub use alerts::query_alerts;
pub use usage::resource_usage_report;
