use crate::output::{self, OutputFormat};
use crate::InfoCommands;
use anyhow::Result;
use kubediag_core::cluster::inventory;
use kubediag_core::types::ApiResourceInfo;
use kubediag_core::DiagClient;
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct NameRow {
    name: String,
}

fn names(items: Vec<String>) -> Vec<NameRow> {
    items.into_iter().map(|name| NameRow { name }).collect()
}

#[derive(Tabled, Serialize)]
struct ApiResourceRow {
    name: String,
    #[tabled(rename = "apiversion")]
    group_version: String,
    namespaced: bool,
    kind: String,
    verbs: String,
}

impl From<ApiResourceInfo> for ApiResourceRow {
    fn from(r: ApiResourceInfo) -> Self {
        Self {
            name: r.name,
            group_version: r.group_version,
            namespaced: r.namespaced,
            kind: r.kind,
            verbs: r.verbs.join(","),
        }
    }
}

#[derive(Serialize)]
struct ContextInfo<'a> {
    context: Option<&'a str>,
    cluster: Option<&'a str>,
    api_server: &'a str,
}

pub async fn handle_info_command(
    command: InfoCommands,
    client: &DiagClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        InfoCommands::Version => {
            let version = inventory::server_version(client).await?;
            match format {
                OutputFormat::Table => {
                    println!("Server Version: {} ({})", version.git_version, version.server);
                    println!("Platform:       {}", version.platform);
                }
                _ => output::print_single(&version, format)?,
            }
        }

        InfoCommands::Context => {
            let info = ContextInfo {
                context: client.context(),
                cluster: client.cluster_name(),
                api_server: client.api_server(),
            };
            match format {
                OutputFormat::Table => {
                    println!("Context:    {}", info.context.unwrap_or("<default>"));
                    println!("Cluster:    {}", info.cluster.unwrap_or("<unknown>"));
                    println!("API server: {}", info.api_server);
                }
                _ => output::print_single(&info, format)?,
            }
        }

        InfoCommands::Nodes => {
            let counts = inventory::node_roles(client).await;
            output::print_output(names(inventory::node_names(client).await), format)?;
            if format == OutputFormat::Table {
                output::print_info(&format!(
                    "{} control-plane, {} worker nodes",
                    counts.control_plane, counts.workers
                ));
            }
        }

        InfoCommands::Namespaces => {
            output::print_output(names(inventory::namespace_names(client).await), format)?;
        }

        InfoCommands::Pods { namespace } => {
            output::print_output(names(inventory::pod_names(client, &namespace).await), format)?;
        }

        InfoCommands::Containers { pod } => {
            output::print_output(names(inventory::container_names(client, &pod).await), format)?;
        }

        InfoCommands::ApiResources => {
            let rows: Vec<ApiResourceRow> = inventory::api_resources(client)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            output::print_output(rows, format)?;
        }
    }

    Ok(())
}

pub async fn handle_service_ip_command(
    client: &DiagClient,
    namespace: &str,
    name: &str,
) -> Result<()> {
    match inventory::load_balancer_ip(client, namespace, name).await? {
        Some(address) => println!("{}", address),
        None => output::print_warning(&format!(
            "Service {}/{} has no load balancer address yet",
            namespace, name
        )),
    }
    Ok(())
}
