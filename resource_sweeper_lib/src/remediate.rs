use std::future::Future;
use std::io;

use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cluster::Cluster;
use crate::SweepError;

/// Operator gate in front of every destructive action. Injected so the
/// remediation flow can be driven without a real terminal.
pub trait Confirm {
    fn confirm(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

/// Reads one line from stdin. Any content, including immediate end of input,
/// counts as confirmed; only a read error aborts.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    async fn confirm(&mut self) -> io::Result<()> {
        info!("-> Press Return key to continue.");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(())
    }
}

/// Asks the operator, then issues the foreground-cascading delete. A failed
/// confirmation read or a failed delete both surface as fatal errors; the
/// caller decides whether the whole run stops.
pub async fn remediate<C: Cluster, P: Confirm>(
    cluster: &C,
    confirm: &mut P,
    namespace: &str,
    name: &str,
) -> Result<(), SweepError> {
    confirm.confirm().await?;

    info!("Deleting deployment {name}...");
    cluster
        .delete_workload(namespace, name)
        .await
        .map_err(|err| SweepError::Delete {
            name: name.to_string(),
            err,
        })?;
    info!("Deleted deployment {name}.");
    Ok(())
}
