//! Remote command execution
//!
//! Runs one shell command in a container over the exec subresource and
//! captures stdout and stderr separately. No pseudo-terminal is requested, so
//! the remote side keeps the two streams apart and error text lands in
//! `stderr`.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::{Api, AttachParams};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::client::DiagClient;
use crate::error::{DiagError, DiagResult};

/// Shell every command is wrapped in
pub const SHELL: &str = "/bin/sh";

/// Output from an exec command
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExecOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code reported by the server; `None` if no status was sent
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    /// True when the remote command reported a zero exit code
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a single shell command inside a container
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` through `sh -c` in `namespace/pod`, container `container`.
    ///
    /// A non-zero remote exit is reported through [`ExecOutput::exit_code`],
    /// not as an error. Exceeding `timeout` aborts the stream and returns
    /// [`DiagError::ExecTimeout`].
    async fn execute(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        command: &str,
        timeout: Duration,
    ) -> DiagResult<ExecOutput>;
}

/// Argument vector sent to the exec subresource
pub fn shell_command(command: &str) -> DiagResult<Vec<String>> {
    if command.trim().is_empty() {
        return Err(DiagError::InvalidCommand("command is empty".to_string()));
    }
    Ok(vec![SHELL.to_string(), "-c".to_string(), command.to_string()])
}

/// Exec parameters: stdout and stderr captured, no stdin, no TTY
pub fn attach_params(container: &str) -> AttachParams {
    AttachParams::default()
        .container(container)
        .stdin(false)
        .stdout(true)
        .stderr(true)
        .tty(false)
}

/// Exit code carried by an exec status message
pub fn exit_code(status: &Status) -> i32 {
    if status.status.as_deref() == Some("Success") {
        return 0;
    }

    status
        .details
        .as_ref()
        .and_then(|d| d.causes.as_ref())
        .and_then(|causes| {
            causes
                .iter()
                .find(|c| c.reason.as_deref() == Some("ExitCode"))
                .and_then(|c| c.message.as_deref())
                .and_then(|m| m.trim().parse().ok())
        })
        .unwrap_or(1)
}

/// [`CommandExecutor`] backed by the pod exec subresource
#[derive(Debug, Clone)]
pub struct PodExecutor {
    client: DiagClient,
}

impl PodExecutor {
    pub fn new(client: DiagClient) -> Self {
        Self { client }
    }

    async fn run(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        argv: Vec<String>,
    ) -> DiagResult<ExecOutput> {
        let pods: Api<Pod> = Api::namespaced(self.client.inner().clone(), namespace);

        let mut attached = pods.exec(pod, argv, &attach_params(container)).await?;

        let status = attached.take_status();
        let stdout = attached.stdout();
        let stderr = attached.stderr();

        // Drain both streams together so a full stderr buffer cannot stall stdout
        let (stdout, stderr) = tokio::try_join!(drain(stdout), drain(stderr))
            .map_err(|e| DiagError::Exec(format!("failed to read exec stream: {}", e)))?;

        let exit_code = match status {
            Some(status) => status.await.as_ref().map(exit_code),
            None => None,
        };

        Ok(ExecOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

#[async_trait]
impl CommandExecutor for PodExecutor {
    async fn execute(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        command: &str,
        timeout: Duration,
    ) -> DiagResult<ExecOutput> {
        let argv = shell_command(command)?;

        tracing::debug!(namespace, pod, container, command, "exec");

        // Dropping the attached process on timeout closes the websocket
        let output = tokio::time::timeout(timeout, self.run(namespace, pod, container, argv))
            .await
            .map_err(|_| DiagError::ExecTimeout {
                namespace: namespace.to_string(),
                pod: pod.to_string(),
                timeout,
            })??;

        if !output.succeeded() {
            tracing::debug!(
                namespace,
                pod,
                exit_code = ?output.exit_code,
                "remote command did not succeed"
            );
        }

        Ok(output)
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
