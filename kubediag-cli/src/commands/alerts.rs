use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use kubediag_core::observability::alerts;
use kubediag_core::types::Alert;
use kubediag_core::{DiagClient, DiagConfig, PodExecutor};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct AlertRow {
    name: String,
    severity: String,
    pod: String,
    #[tabled(rename = "since")]
    starts_at: String,
    summary: String,
}

impl From<Alert> for AlertRow {
    fn from(a: Alert) -> Self {
        Self {
            name: a.name,
            severity: a.severity,
            pod: a.pod_name,
            starts_at: a.starts_at,
            summary: a.summary,
        }
    }
}

pub async fn handle_alerts_command(
    client: &DiagClient,
    config: &DiagConfig,
    format: OutputFormat,
) -> Result<()> {
    let executor = PodExecutor::new(client.clone());
    let alerts = alerts::query_alerts(&executor, &config.alerts, config.exec.timeout())
        .await
        .context("Failed to query alertmanager")?;

    let rows: Vec<AlertRow> = alerts.into_iter().map(Into::into).collect();
    output::print_output(rows, format)
}
