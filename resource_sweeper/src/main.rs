use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use log::{error, info};
use resource_sweeper_lib::cluster::KubeCluster;
use resource_sweeper_lib::config::{Config as SweeperConfig, DEFAULT_NAMESPACE};
use resource_sweeper_lib::notify::SlackNotifier;
use resource_sweeper_lib::remediate::StdinConfirm;

/// Deletes deployments whose containers run without explicit resource
/// requests and limits, after asking first. Each deletion is reported to a
/// Slack channel.
#[derive(Parser)]
#[command(name = "resource_sweeper", about)]
struct Args {
    /// Namespace to sweep.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Path to a kubeconfig file; in-cluster config is tried first when absent.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Slack token (falls back to SLACK_TOKEN).
    #[arg(long)]
    token: Option<String>,

    /// Slack channel (falls back to SLACK_CHANNEL).
    #[arg(long)]
    channel: Option<String>,

    /// Keep sweeping after a failed delete instead of aborting.
    #[arg(long)]
    continue_on_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if cfg!(debug_assertions) {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let args = Args::parse();
    let config = SweeperConfig::new(&args.namespace, args.token, args.channel)?;
    let notifier = SlackNotifier::new(&config)?;

    let client = match kube_client(args.kubeconfig.as_deref()).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to start Kubernetes client.");
            return Err(e);
        }
    };

    let cluster = KubeCluster::new(client);
    let mut confirm = StdinConfirm;
    resource_sweeper_lib::run(
        &cluster,
        &notifier,
        &mut confirm,
        &config.namespace,
        args.continue_on_error,
    )
    .await?;

    Ok(())
}

async fn kube_client(kubeconfig: Option<&Path>) -> Result<Client> {
    if let Some(path) = kubeconfig {
        info!("Using kubeconfig at {}", path.display());
        let kubeconfig = Kubeconfig::read_from(path).context("Failed to read kubeconfig")?;
        let config =
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        return Client::try_from(config).map_err(anyhow::Error::from);
    }

    match Config::incluster() {
        Ok(config) => {
            info!("Running resource_sweeper inside cluster.");
            Client::try_from(config).map_err(anyhow::Error::from)
        }
        Err(_) => {
            info!("Running resource_sweeper outside cluster.");
            Client::try_default().await.map_err(anyhow::Error::from)
        }
    }
}
