use std::collections::BTreeMap;
use std::future::Future;

use anyhow::Result;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{DeleteParams, ListParams};
use kube::{Api, Client};

/// Narrow view of the cluster: everything a sweep needs to read or delete.
pub trait Cluster {
    fn list_workloads(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<Deployment>>> + Send;

    fn list_pods(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Pod>>> + Send;

    /// Foreground-cascading delete: children go before the parent delete
    /// is reported complete.
    fn delete_workload(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Cluster for KubeCluster {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let deployments = api.list(&ListParams::default()).await?;
        Ok(deployments.items)
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(selector);
        let pods = api.list(&params).await?;
        Ok(pods.items)
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> Result<()> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::foreground()).await?;
        Ok(())
    }
}

/// Builds the exact-match selector string (`k1=v1,k2=v2`) for a label set.
/// An empty set yields the empty selector, which matches every pod.
pub fn selector_string(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}
