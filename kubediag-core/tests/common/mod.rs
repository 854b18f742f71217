//! Common test fixtures and a scripted command executor

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, Node, NodeCondition, NodeStatus, Pod, PodSpec, PodStatus, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kubediag_core::error::{DiagError, DiagResult};
use kubediag_core::exec::{CommandExecutor, ExecOutput};
use kubediag_core::observability::metrics::{ContainerMetrics, PodMetrics};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

pub fn quantities(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ])
}

/// Node with a single `Ready` condition
pub fn create_test_node(name: &str, ready: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            conditions: Some(vec![NodeCondition {
                type_: "Ready".to_string(),
                status: ready.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn create_test_pod(namespace: &str, name: &str, phase: &str) -> Pod {
    Pod {
        metadata: meta(namespace, name),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pod scheduled on `worker` whose containers request `(name, cpu, memory)`
pub fn create_workload_pod(
    namespace: &str,
    name: &str,
    worker: &str,
    containers: &[(&str, &str, &str)],
) -> Pod {
    Pod {
        metadata: meta(namespace, name),
        spec: Some(PodSpec {
            node_name: Some(worker.to_string()),
            containers: containers
                .iter()
                .map(|(container, cpu, memory)| Container {
                    name: container.to_string(),
                    resources: Some(ResourceRequirements {
                        requests: Some(quantities(cpu, memory)),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn create_pod_metrics(
    namespace: &str,
    name: &str,
    containers: &[(&str, &str, &str)],
) -> PodMetrics {
    PodMetrics {
        metadata: meta(namespace, name),
        containers: containers
            .iter()
            .map(|(container, cpu, memory)| ContainerMetrics {
                name: container.to_string(),
                usage: quantities(cpu, memory),
            })
            .collect(),
        ..Default::default()
    }
}

/// One recorded `execute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCall {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub command: String,
}

/// Executor answering from a queue of scripted results
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<DiagResult<ExecOutput>>>,
    calls: Mutex<Vec<ExecCall>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(self, stdout: &str) -> Self {
        self.with_output(ExecOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    pub fn with_output(self, output: ExecOutput) -> Self {
        self.push(Ok(output))
    }

    pub fn with_error(self, error: DiagError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: DiagResult<ExecOutput>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        command: &str,
        _timeout: Duration,
    ) -> DiagResult<ExecOutput> {
        self.calls.lock().unwrap().push(ExecCall {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
            command: command.to_string(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DiagError::Exec("no scripted response".to_string())))
    }
}

pub const TIMEOUT: Duration = Duration::from_secs(5);
