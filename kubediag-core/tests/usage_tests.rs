//! Resource Usage Tests
//! Joining pod listings against metrics snapshots

mod common;

use common::{create_pod_metrics, create_workload_pod};
use kubediag_core::observability::usage::build_report;
use kubediag_core::quantity::usage_percentage;
use kubediag_core::types::PodUsage;
use std::collections::BTreeMap;

fn by_key(usages: &[PodUsage]) -> BTreeMap<String, &PodUsage> {
    usages
        .iter()
        .map(|u| (format!("{}/{}", u.namespace, u.pod_name), u))
        .collect()
}

#[test]
fn test_pod_without_metrics_has_no_container_usages() {
    let pods = vec![create_workload_pod("X", "Y", "worker-1", &[("app", "100m", "64Mi")])];

    let report = build_report(&pods, &[]);

    assert_eq!(
        report.pods_usage,
        vec![PodUsage {
            pod_name: "Y".to_string(),
            namespace: "X".to_string(),
            container_usages: vec![],
        }]
    );
}

#[test]
fn test_percentages_per_container() {
    let pods = vec![create_workload_pod(
        "shop",
        "web-0",
        "worker-1",
        &[("app", "500m", "1Gi"), ("proxy", "100m", "128Mi")],
    )];
    let metrics = vec![create_pod_metrics(
        "shop",
        "web-0",
        &[("proxy", "50m", "32Mi"), ("app", "250m", "512Mi")],
    )];

    let report = build_report(&pods, &metrics);
    let usages = &report.pods_usage[0].container_usages;

    assert_eq!(usages.len(), 2);
    assert_eq!(usages[0].name, "app");
    assert!((usages[0].cpu_usage_percent - 50.0).abs() < 1e-9);
    assert!((usages[0].memory_usage_percent - 50.0).abs() < 1e-9);
    assert_eq!(usages[1].name, "proxy");
    assert!((usages[1].cpu_usage_percent - 50.0).abs() < 1e-9);
    assert!((usages[1].memory_usage_percent - 25.0).abs() < 1e-9);
}

#[test]
fn test_zero_request_yields_zero_percent() {
    let pods = vec![create_workload_pod("ns", "p", "w", &[("app", "0", "0")])];
    let metrics = vec![create_pod_metrics("ns", "p", &[("app", "3", "2Gi")])];

    let usage = &build_report(&pods, &metrics).pods_usage[0].container_usages[0];
    assert_eq!(usage.cpu_usage_percent, 0.0);
    assert_eq!(usage.memory_usage_percent, 0.0);

    for used in [0.0, 1.0, 1e12, f64::MAX] {
        assert_eq!(usage_percentage(used, 0.0), 0.0);
    }
}

#[test]
fn test_same_name_in_different_namespaces() {
    let pods = vec![
        create_workload_pod("a", "api", "w", &[("app", "100m", "100Mi")]),
        create_workload_pod("b", "api", "w", &[("app", "100m", "100Mi")]),
    ];
    let metrics = vec![create_pod_metrics("b", "api", &[("app", "10m", "10Mi")])];

    let report = build_report(&pods, &metrics);
    let usages = by_key(&report.pods_usage);

    assert!(usages["a/api"].container_usages.is_empty());
    assert_eq!(usages["b/api"].container_usages.len(), 1);
}

#[test]
fn test_join_independent_of_input_order() {
    let pods = vec![
        create_workload_pod("ns1", "a", "w1", &[("c", "100m", "100Mi")]),
        create_workload_pod("ns1", "b", "w1", &[("c", "200m", "200Mi")]),
        create_workload_pod("ns2", "a", "w2", &[("c", "400m", "400Mi")]),
        create_workload_pod("ns2", "d", "w2", &[("c", "100m", "100Mi")]),
    ];
    let metrics = vec![
        create_pod_metrics("ns1", "a", &[("c", "50m", "10Mi")]),
        create_pod_metrics("ns1", "b", &[("c", "20m", "100Mi")]),
        create_pod_metrics("ns2", "a", &[("c", "400m", "40Mi")]),
    ];

    let forward = build_report(&pods, &metrics);

    let mut pods_rev = pods.clone();
    pods_rev.reverse();
    let mut metrics_rot = metrics.clone();
    metrics_rot.rotate_left(1);
    let shuffled = build_report(&pods_rev, &metrics_rot);

    assert_eq!(by_key(&forward.pods_usage), by_key(&shuffled.pods_usage));
}
