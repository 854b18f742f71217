//! Remote trace level
//!
//! Services expose a local HTTP endpoint that switches their trace filter.
//! It is reached with `curl` from inside the service container.

use std::time::Duration;

use crate::error::{DiagError, DiagResult};
use crate::exec::{CommandExecutor, ExecOutput};

/// curl line enabling `level` for every trace filter
pub fn debug_level_command(port: u16, level: &str) -> DiagResult<String> {
    let valid = !level.is_empty()
        && level
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DiagError::InvalidCommand(format!(
            "invalid trace level {:?}",
            level
        )));
    }

    Ok(format!(
        "curl http://127.0.0.1:{}/tenv/eTrace/enable?filter=all\\&level={}",
        port, level
    ))
}

/// Switch the trace level of the service in `namespace/pod`
pub async fn set_debug_level<E>(
    executor: &E,
    namespace: &str,
    pod: &str,
    container: &str,
    level: &str,
    port: u16,
    timeout: Duration,
) -> DiagResult<ExecOutput>
where
    E: CommandExecutor + ?Sized,
{
    let command = debug_level_command(port, level)?;
    let output = executor
        .execute(namespace, pod, container, &command, timeout)
        .await?;

    if output.succeeded() {
        tracing::info!(namespace, pod, level, "Trace level updated");
    } else {
        tracing::warn!(
            namespace,
            pod,
            exit_code = ?output.exit_code,
            stderr = %output.stderr.trim(),
            "Trace level request failed"
        );
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_escapes_ampersand() {
        assert_eq!(
            debug_level_command(9090, "DEBUG_3").unwrap(),
            r"curl http://127.0.0.1:9090/tenv/eTrace/enable?filter=all\&level=DEBUG_3"
        );
    }

    #[test]
    fn test_level_with_shell_characters_rejected() {
        assert!(debug_level_command(9090, "DEBUG;rm -rf /").is_err());
        assert!(debug_level_command(9090, "").is_err());
    }
}
