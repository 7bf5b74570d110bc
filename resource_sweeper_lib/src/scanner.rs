use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use log::{debug, error, info};

use crate::cluster::{selector_string, Cluster};
use crate::compliance::is_compliant;
use crate::SweepError;

/// Reason attached to every violation this scanner can detect.
pub const REASON_EMPTY_RESOURCES: &str = "empty resources constraints";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Compliant,
    Violation {
        pod: String,
        container: String,
        reason: String,
    },
}

impl Verdict {
    pub fn is_compliant(&self) -> bool {
        matches!(self, Verdict::Compliant)
    }
}

/// Lists every deployment in the namespace and judges each one against the
/// pods currently matching its selector. A pod-lookup failure for one
/// deployment is logged and that deployment is left out of the result; it
/// never aborts the rest of the scan.
pub async fn scan<C: Cluster>(
    cluster: &C,
    namespace: &str,
) -> Result<Vec<(Deployment, Verdict)>, SweepError> {
    info!("Listing deployments in namespace {namespace:?}");
    let workloads = cluster.list_workloads(namespace).await.map_err(|err| {
        SweepError::ListWorkloads {
            namespace: namespace.to_string(),
            err,
        }
    })?;

    let mut verdicts = Vec::with_capacity(workloads.len());
    for workload in workloads {
        let selector = workload
            .spec
            .as_ref()
            .and_then(|spec| spec.selector.match_labels.as_ref())
            .map(selector_string)
            .unwrap_or_default();

        let pods = match cluster.list_pods(namespace, &selector).await {
            Ok(pods) => pods,
            Err(e) => {
                error!("List pods of deploy [{}] error: {e}", workload.name_any());
                continue;
            }
        };

        let verdict = check_pods(&pods);
        verdicts.push((workload, verdict));
    }

    Ok(verdicts)
}

// First violation wins; remaining containers and pods are not inspected.
fn check_pods(pods: &[Pod]) -> Verdict {
    for pod in pods {
        let Some(spec) = pod.spec.as_ref() else {
            continue;
        };
        for container in &spec.containers {
            if !is_compliant(container) {
                let node = spec.node_name.as_deref().unwrap_or("<unscheduled>");
                info!(" * pod: {} on {node}", pod.name_any());
                info!(
                    " * container: {} got empty resources requests: {:?}, limits: {:?}",
                    container.name,
                    container.resources.as_ref().and_then(|r| r.requests.as_ref()),
                    container.resources.as_ref().and_then(|r| r.limits.as_ref()),
                );
                return Verdict::Violation {
                    pod: pod.name_any(),
                    container: container.name.clone(),
                    reason: REASON_EMPTY_RESOURCES.to_string(),
                };
            }
            debug!(
                " * container: {}, resources requests {:?} limits {:?}",
                container.name,
                container.resources.as_ref().and_then(|r| r.requests.as_ref()),
                container.resources.as_ref().and_then(|r| r.limits.as_ref()),
            );
        }
    }
    Verdict::Compliant
}
