use crate::output::{self, OutputFormat};
use crate::RedisCommands;
use anyhow::{Context, Result};
use kubediag_core::redis as redis_diag;
use kubediag_core::types::{RedisCommandOutput, RedisStatus};
use kubediag_core::{DiagClient, DiagConfig, PodExecutor};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct RedisNodeRow {
    pod: String,
    role: String,
    zone: String,
    ip: String,
    worker: String,
    cpu: String,
    memory: String,
}

#[derive(Tabled, Serialize)]
struct CommandOutputRow {
    pod: String,
    output: String,
}

impl From<RedisCommandOutput> for CommandOutputRow {
    fn from(o: RedisCommandOutput) -> Self {
        Self {
            pod: o.pod_name,
            output: o.output.trim_end().to_string(),
        }
    }
}

fn node_rows(status: &RedisStatus) -> Vec<RedisNodeRow> {
    status
        .nodes()
        .iter()
        .map(|node| {
            let details = status.pod_details.get(&node.pod_name).cloned().unwrap_or_default();
            RedisNodeRow {
                pod: node.pod_name.clone(),
                role: node.role.to_string(),
                zone: node.zone.clone(),
                ip: format!("{}:{}", node.ip, node.port),
                worker: details.worker,
                cpu: details.cpu,
                memory: details.memory,
            }
        })
        .collect()
}

fn print_summary(status: &RedisStatus) {
    let cluster = &status.report.cluster;
    println!(
        "Cluster state:        {} ({})",
        output::status_marker(status.cluster_state_ok),
        cluster.status
    );
    println!(
        "Pods ready:           {} ({}/{})",
        output::status_marker(status.pod_status_ok),
        cluster.number_of_pods_ready,
        cluster.number_of_pods
    );
    println!("Primaries configured: {}", status.primaries_configured);
    println!("Replicas configured:  {}", status.replicas_configured);
    println!("Known nodes:          {}", status.known_nodes);
    println!("Active zones:         {}", status.active_zones);
    println!("Zones with primaries: {}", status.zones_with_primaries);
    println!("Max primaries/zone:   {}", status.max_primaries_in_zone);
    println!();
}

pub async fn handle_redis_command(
    command: RedisCommands,
    client: &DiagClient,
    config: &DiagConfig,
    format: OutputFormat,
) -> Result<()> {
    let executor = PodExecutor::new(client.clone());
    let timeout = config.exec.timeout();

    match command {
        RedisCommands::Status => {
            let status = redis_diag::resolve(client, &config.redis)
                .await
                .context("Failed to resolve redis cluster status")?;

            if format != OutputFormat::Table {
                return output::print_single(&status, format);
            }

            print_summary(&status);
            output::print_table(node_rows(&status));
            for failure in &status.enrichment_failures {
                output::print_warning(&format!("{}: {}", failure.pod_name, failure.reason));
            }
        }

        RedisCommands::Dbsize => {
            let outputs = redis_diag::db_size(client, &executor, &config.redis, timeout).await?;
            let rows: Vec<CommandOutputRow> = outputs.into_iter().map(Into::into).collect();
            output::print_output(rows, format)?;
        }

        RedisCommands::Flush { yes } => {
            use dialoguer::Confirm;

            let confirm = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete every key in {}?",
                        config.redis.service_address()
                    ))
                    .default(false)
                    .interact()?;

            if confirm {
                let outputs = redis_diag::flush_all(client, &executor, &config.redis, timeout)
                    .await
                    .context("Flush aborted")?;
                output::print_success(&format!("Flushed from {} pods", outputs.len()));
            } else {
                output::print_info("Flush cancelled");
            }
        }
    }

    Ok(())
}
