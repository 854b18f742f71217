use crate::output::{self, format_percent, OutputFormat};
use anyhow::{Context, Result};
use kubediag_core::observability::usage;
use kubediag_core::types::PodUsage;
use kubediag_core::DiagClient;
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct ContainerUsageRow {
    namespace: String,
    pod: String,
    container: String,
    #[tabled(rename = "cpu %")]
    cpu: String,
    #[tabled(rename = "memory %")]
    memory: String,
}

fn rows(pod: &PodUsage) -> Vec<ContainerUsageRow> {
    if pod.container_usages.is_empty() {
        return vec![ContainerUsageRow {
            namespace: pod.namespace.clone(),
            pod: pod.pod_name.clone(),
            container: "-".to_string(),
            cpu: "n/a".to_string(),
            memory: "n/a".to_string(),
        }];
    }

    pod.container_usages
        .iter()
        .map(|c| ContainerUsageRow {
            namespace: pod.namespace.clone(),
            pod: pod.pod_name.clone(),
            container: c.name.clone(),
            cpu: format_percent(c.cpu_usage_percent),
            memory: format_percent(c.memory_usage_percent),
        })
        .collect()
}

pub async fn handle_usage_command(
    client: &DiagClient,
    namespace: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut report = usage::resource_usage_report(client)
        .await
        .context("Failed to build resource usage report")?;

    if let Some(namespace) = namespace {
        report.pods_usage.retain(|p| p.namespace == namespace);
    }

    match format {
        OutputFormat::Table => {
            let rows: Vec<ContainerUsageRow> = report.pods_usage.iter().flat_map(rows).collect();
            output::print_table(rows);
            Ok(())
        }
        _ => output::print_single(&report, format),
    }
}
