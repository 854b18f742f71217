use crate::output::{self, OutputFormat};
use anyhow::Result;
use kubediag_core::cluster::health;
use kubediag_core::types::TestStatus;
use kubediag_core::{DiagClient, DiagConfig};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct VerdictRow {
    check: String,
    status: String,
    detail: String,
}

impl VerdictRow {
    fn new(check: &str, verdict: &TestStatus) -> Self {
        Self {
            check: check.to_string(),
            status: output::status_marker(verdict.passed),
            detail: match &verdict.error {
                Some(error) => format!("error: {}", error),
                None => verdict.detail.clone(),
            },
        }
    }
}

pub async fn handle_health_command(
    client: &DiagClient,
    config: &DiagConfig,
    format: OutputFormat,
) -> Result<()> {
    let report = health::run_all(client, &config.health).await;

    if format != OutputFormat::Table {
        return output::print_single(&report, format);
    }

    let rows: Vec<VerdictRow> = report
        .verdicts()
        .iter()
        .map(|(check, verdict)| VerdictRow::new(check, verdict))
        .collect();
    output::print_table(rows);

    if report.all_passed() {
        output::print_success("All health checks passed");
    } else {
        output::print_warning("Some health checks failed");
    }

    Ok(())
}
