//! Alert Query Tests
//! amtool invocation and alert flattening over a scripted executor

mod common;

use common::{ScriptedExecutor, TIMEOUT};
use kubediag_core::config::AlertsConfig;
use kubediag_core::error::DiagError;
use kubediag_core::exec::ExecOutput;
use kubediag_core::observability::alerts::query_alerts;
use kubediag_core::trace::set_debug_level;
use kubediag_core::types::Alert;

#[tokio::test]
async fn test_alert_records_flattened() {
    let records = serde_json::json!([{
        "labels": {"alertname": "A", "severity": "critical", "pod": "p1"},
        "annotations": {"summary": "S"},
        "startsAt": "t1"
    }]);
    let executor = ScriptedExecutor::new().with_stdout(&records.to_string());

    let alerts = query_alerts(&executor, &AlertsConfig::default(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(
        alerts,
        vec![Alert {
            name: "A".to_string(),
            severity: "critical".to_string(),
            starts_at: "t1".to_string(),
            pod_name: "p1".to_string(),
            summary: "S".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_query_targets_alertmanager_container() {
    let executor = ScriptedExecutor::new().with_stdout("[]");

    query_alerts(&executor, &AlertsConfig::default(), TIMEOUT)
        .await
        .unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].namespace, "fed-prometheus");
    assert_eq!(calls[0].pod, "alertmanager-prometheus-alerts-0");
    assert_eq!(calls[0].container, "alertmanager");
    assert_eq!(
        calls[0].command,
        "amtool -o json alert query -a --alertmanager.url http://localhost:9093"
    );
}

#[tokio::test]
async fn test_undecodable_output_is_returned_as_error() {
    let executor = ScriptedExecutor::new().with_output(ExecOutput {
        stdout: String::new(),
        stderr: "amtool: error: dial tcp: connection refused".to_string(),
        exit_code: Some(1),
    });

    let err = query_alerts(&executor, &AlertsConfig::default(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(err.is_decode());
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_exec_timeout_propagates() {
    let executor = ScriptedExecutor::new().with_error(DiagError::ExecTimeout {
        namespace: "fed-prometheus".to_string(),
        pod: "alertmanager-prometheus-alerts-0".to_string(),
        timeout: TIMEOUT,
    });

    let err = query_alerts(&executor, &AlertsConfig::default(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, DiagError::ExecTimeout { .. }));
}

#[tokio::test]
async fn test_set_debug_level_reports_exit_code() {
    let executor = ScriptedExecutor::new().with_output(ExecOutput {
        stdout: String::new(),
        stderr: "curl: (7) Failed to connect".to_string(),
        exit_code: Some(7),
    });

    let output = set_debug_level(&executor, "apps", "svc-0", "svc", "DEBUG_2", 9090, TIMEOUT)
        .await
        .unwrap();

    assert!(!output.succeeded());
    assert_eq!(
        executor.calls()[0].command,
        r"curl http://127.0.0.1:9090/tenv/eTrace/enable?filter=all\&level=DEBUG_2"
    );
}

#[tokio::test]
async fn test_invalid_debug_level_never_executes() {
    let executor = ScriptedExecutor::new();

    let err = set_debug_level(&executor, "apps", "svc-0", "svc", "x\"; id", 9090, TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, DiagError::InvalidCommand(_)));
    assert!(executor.calls().is_empty());
}
