pub mod cluster;
pub mod compliance;
pub mod config;
pub mod notify;
pub mod remediate;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testutil;

use kube::ResourceExt;
use log::error;
use thiserror::Error;

use cluster::Cluster;
use notify::{Action, Notify, RemediationEvent};
use remediate::Confirm;
use scanner::Verdict;

/// Errors that stop a sweep. Pod-lookup failures for a single deployment are
/// not here: the scanner logs those and moves on.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("failed to list deployments in namespace `{namespace}`: {err}")]
    ListWorkloads { namespace: String, err: anyhow::Error },

    #[error("confirmation stream failed: {0}")]
    Confirmation(#[from] std::io::Error),

    #[error("failed to delete deployment `{name}`: {err}")]
    Delete { name: String, err: anyhow::Error },
}

/// One sequential pass over the namespace: scan, then for each offending
/// deployment confirm, delete, notify. A failed delete aborts the whole run
/// unless `continue_on_error` is set; a failed confirmation read always
/// aborts, since the operator gate itself is gone.
pub async fn run<C, N, P>(
    cluster: &C,
    notifier: &N,
    confirm: &mut P,
    namespace: &str,
    continue_on_error: bool,
) -> Result<(), SweepError>
where
    C: Cluster,
    N: Notify,
    P: Confirm,
{
    let verdicts = scanner::scan(cluster, namespace).await?;

    for (workload, verdict) in verdicts {
        let Verdict::Violation { reason, .. } = verdict else {
            continue;
        };

        let name = workload.name_any();
        match remediate::remediate(cluster, confirm, namespace, &name).await {
            Ok(()) => {
                let event = RemediationEvent::new(namespace, &name, &reason, Action::Deleted);
                notifier.notify(&event).await;
            }
            Err(e @ SweepError::Delete { .. }) if continue_on_error => {
                error!("{e}; continuing with remaining deployments");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
