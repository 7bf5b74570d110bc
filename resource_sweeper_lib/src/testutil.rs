use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

use crate::cluster::Cluster;
use crate::notify::{Notify, RemediationEvent};
use crate::remediate::Confirm;

/// Shared ordered log of collaborator calls, for asserting happens-before
/// relations across fakes.
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub(crate) fn quantities(pairs: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
        .collect()
}

pub(crate) fn container(
    name: &str,
    requests: Option<BTreeMap<String, Quantity>>,
    limits: Option<BTreeMap<String, Quantity>>,
) -> Container {
    Container {
        name: name.to_string(),
        resources: Some(ResourceRequirements {
            requests,
            limits,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Container with no resources block at all.
pub(crate) fn bare_container(name: &str) -> Container {
    Container {
        name: name.to_string(),
        resources: None,
        ..Default::default()
    }
}

pub(crate) fn compliant_container(name: &str) -> Container {
    container(
        name,
        Some(quantities(&[("cpu", "100m")])),
        Some(quantities(&[("cpu", "200m")])),
    )
}

pub(crate) fn pod(name: &str, containers: Vec<Container>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers,
            node_name: Some("node-1".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn deployment(name: &str, match_labels: &[(&str, &str)]) -> Deployment {
    let match_labels = if match_labels.is_empty() {
        None
    } else {
        Some(labels(match_labels))
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels,
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Scripted cluster: workloads and pods are served from memory, every call
/// is appended to the shared log.
pub(crate) struct FakeCluster {
    pub workloads: Vec<Deployment>,
    pub pods_by_selector: BTreeMap<String, Result<Vec<Pod>, String>>,
    pub failing_deletes: Vec<String>,
    pub fail_workload_list: bool,
    pub calls: CallLog,
}

impl FakeCluster {
    pub fn new(calls: CallLog) -> Self {
        Self {
            workloads: Vec::new(),
            pods_by_selector: BTreeMap::new(),
            failing_deletes: Vec::new(),
            fail_workload_list: false,
            calls,
        }
    }

    pub fn insert_pods(&mut self, selector: &str, pods: Vec<Pod>) {
        self.pods_by_selector.insert(selector.to_string(), Ok(pods));
    }

    pub fn fail_pods(&mut self, selector: &str, message: &str) {
        self.pods_by_selector
            .insert(selector.to_string(), Err(message.to_string()));
    }
}

impl Cluster for FakeCluster {
    async fn list_workloads(&self, _namespace: &str) -> Result<Vec<Deployment>> {
        self.calls.lock().unwrap().push("list_workloads".to_string());
        if self.fail_workload_list {
            return Err(anyhow!("cluster unreachable"));
        }
        Ok(self.workloads.clone())
    }

    async fn list_pods(&self, _namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list_pods {selector}"));
        match self.pods_by_selector.get(selector) {
            Some(Ok(pods)) => Ok(pods.clone()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn delete_workload(&self, _namespace: &str, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("delete {name}"));
        if self.failing_deletes.iter().any(|n| n == name) {
            return Err(anyhow!("server rejected delete"));
        }
        Ok(())
    }
}

pub(crate) struct FakeConfirm {
    pub fail: bool,
    pub calls: CallLog,
}

impl FakeConfirm {
    pub fn new(calls: CallLog) -> Self {
        Self { fail: false, calls }
    }
}

impl Confirm for FakeConfirm {
    async fn confirm(&mut self) -> io::Result<()> {
        self.calls.lock().unwrap().push("confirm".to_string());
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"));
        }
        Ok(())
    }
}

pub(crate) struct FakeNotify {
    pub events: Mutex<Vec<RemediationEvent>>,
    pub calls: CallLog,
}

impl FakeNotify {
    pub fn new(calls: CallLog) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            calls,
        }
    }
}

impl Notify for FakeNotify {
    async fn notify(&self, event: &RemediationEvent) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("notify {}", event.name));
        self.events.lock().unwrap().push(event.clone());
    }
}
