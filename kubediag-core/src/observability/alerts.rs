//! Alertmanager alerts
//!
//! Queries alertmanager with `amtool` inside its own container and flattens
//! the JSON records into [`Alert`]s.

use std::time::Duration;

use crate::config::AlertsConfig;
use crate::error::{DiagError, DiagResult};
use crate::exec::CommandExecutor;
use crate::types::{Alert, RawAlert};

/// amtool line listing every alert, active or not, as JSON
pub fn alert_query_command(alertmanager_url: &str) -> String {
    format!(
        "amtool -o json alert query -a --alertmanager.url {}",
        alertmanager_url
    )
}

/// Decode captured amtool output; stderr is attached to decode errors
pub fn parse_alerts(stdout: &str, stderr: &str) -> DiagResult<Vec<Alert>> {
    let raw: Vec<RawAlert> = serde_json::from_str(stdout.trim()).map_err(|e| {
        let stderr = stderr.trim();
        if stderr.is_empty() {
            DiagError::decode("amtool output", e)
        } else {
            DiagError::decode("amtool output", format!("{} (stderr: {})", e, stderr))
        }
    })?;

    Ok(raw.into_iter().map(Alert::from).collect())
}

/// Query alertmanager for all alerts
pub async fn query_alerts<E>(
    executor: &E,
    config: &AlertsConfig,
    timeout: Duration,
) -> DiagResult<Vec<Alert>>
where
    E: CommandExecutor + ?Sized,
{
    let command = alert_query_command(&config.alertmanager_url);
    let output = executor
        .execute(
            &config.namespace,
            &config.pod,
            &config.container,
            &command,
            timeout,
        )
        .await?;

    let alerts = parse_alerts(&output.stdout, &output.stderr)
        .inspect_err(|e| tracing::warn!(exit_code = ?output.exit_code, "{}", e))?;

    tracing::debug!(count = alerts.len(), "Fetched alerts");

    Ok(alerts)
}
