//! Store-wide redis-cli calls
//!
//! Runs a `redis-cli --cluster call` subcommand from every pod of the
//! data-store namespace against the cluster service.

use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::ResourceExt;
use std::time::Duration;

use crate::client::DiagClient;
use crate::config::RedisConfig;
use crate::error::DiagResult;
use crate::exec::CommandExecutor;
use crate::types::RedisCommandOutput;

/// redis-cli line running `subcommand` on every primary
pub fn cluster_call_command(config: &RedisConfig, subcommand: &str) -> String {
    format!(
        "redis-cli --cluster call --cluster-only-masters {} {}",
        config.service_address(),
        subcommand
    )
}

async fn redis_pod_names(client: &DiagClient, config: &RedisConfig) -> DiagResult<Vec<String>> {
    let pods: Api<Pod> = Api::namespaced(client.inner().clone(), &config.namespace);
    let list = pods.list(&ListParams::default()).await?;
    Ok(list.items.iter().map(|p| p.name_any()).collect())
}

/// Run `dbsize` from each pod and collect the output.
///
/// An exec failure in one pod is logged and recorded as that pod's output;
/// the remaining pods are still queried.
pub async fn db_size_in<E>(
    executor: &E,
    config: &RedisConfig,
    pods: &[String],
    timeout: Duration,
) -> Vec<RedisCommandOutput>
where
    E: CommandExecutor + ?Sized,
{
    let command = cluster_call_command(config, "dbsize");
    let mut outputs = Vec::with_capacity(pods.len());

    for pod in pods {
        let output = match executor
            .execute(&config.namespace, pod, &config.container, &command, timeout)
            .await
        {
            Ok(out) => {
                if !out.stderr.is_empty() {
                    tracing::debug!(pod = pod.as_str(), stderr = %out.stderr, "dbsize stderr");
                }
                out.stdout
            }
            Err(e) => {
                tracing::warn!(pod = pod.as_str(), "Failed to run dbsize: {}", e);
                e.to_string()
            }
        };

        outputs.push(RedisCommandOutput {
            pod_name: pod.clone(),
            output,
        });
    }

    outputs
}

/// Run `flushall` from each pod, stopping at the first exec failure
pub async fn flush_all_in<E>(
    executor: &E,
    config: &RedisConfig,
    pods: &[String],
    timeout: Duration,
) -> DiagResult<Vec<RedisCommandOutput>>
where
    E: CommandExecutor + ?Sized,
{
    let command = cluster_call_command(config, "flushall");
    let mut outputs = Vec::with_capacity(pods.len());

    for pod in pods {
        let out = executor
            .execute(&config.namespace, pod, &config.container, &command, timeout)
            .await
            .inspect_err(|e| tracing::error!(pod = pod.as_str(), "Failed to run flushall: {}", e))?;

        outputs.push(RedisCommandOutput {
            pod_name: pod.clone(),
            output: out.stdout,
        });
    }

    tracing::info!(pods = outputs.len(), "Flushed redis cluster");

    Ok(outputs)
}

/// Key counts reported from every data-store pod
pub async fn db_size<E>(
    client: &DiagClient,
    executor: &E,
    config: &RedisConfig,
    timeout: Duration,
) -> DiagResult<Vec<RedisCommandOutput>>
where
    E: CommandExecutor + ?Sized,
{
    let pods = redis_pod_names(client, config).await?;
    Ok(db_size_in(executor, config, &pods, timeout).await)
}

/// Delete every key in the data store
pub async fn flush_all<E>(
    client: &DiagClient,
    executor: &E,
    config: &RedisConfig,
    timeout: Duration,
) -> DiagResult<Vec<RedisCommandOutput>>
where
    E: CommandExecutor + ?Sized,
{
    let pods = redis_pod_names(client, config).await?;
    flush_all_in(executor, config, &pods, timeout).await
}
