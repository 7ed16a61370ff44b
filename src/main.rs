use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use podchaosmonkey::{
    chaos::{run_scheduler, PodChaosMonkey, RandomSelector},
    config::{Cli, Config},
    k8s::{connect, health_check, spawn_pod_mirror, KubePodDeleter},
    shutdown::shutdown_on_signal,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, flags win over the environment
    let config = Config::load()?.with_cli(cli);
    config.validate()?;
    let deletion_interval = config.deletion_interval()?;

    telemetry::init(&config);
    tracing::info!("podchaosmonkey started");

    let client = connect(config.kubeconfig.as_deref()).await?;
    health_check(&client).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let (mirror, mirror_task) = spawn_pod_mirror(
        client.clone(),
        &config.namespace,
        config.label_selector(),
        shutdown.clone(),
    );

    let monkey = PodChaosMonkey::new(
        KubePodDeleter::new(client),
        mirror,
        &config.namespace,
        config.dry_run,
    );

    let cycles = run_scheduler(&monkey, &RandomSelector, deletion_interval, shutdown.clone()).await;

    // the scheduler only returns once shutdown was requested
    if let Err(e) = mirror_task.await {
        tracing::warn!("Pod mirror task did not stop cleanly: {}", e);
    }

    tracing::info!(cycles, "podchaosmonkey stopped");
    Ok(())
}
