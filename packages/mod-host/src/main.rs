use std::path::PathBuf;

use anyhow::Context;
use mod_host::{Host, HostAppConfig, HostError};
use mod_loader::ModStatus;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut config = HostAppConfig::load().context("Failed to load config")?;
    if let Some(path) = std::env::args().nth(1) {
        config.host.manifests = PathBuf::from(path);
    }
    info!(
        manifests = %config.host.manifests.display(),
        interpreter = %config.host.script_interpreter,
        "Mod host starting"
    );

    let host = Host::build(&config)
        .await
        .context("Failed to initialize mod host")?;
    let logger = host.spawn_event_logger();

    let report = tokio::select! {
        report = host.run(&config.host.manifests) => report,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning pending mods");
            host.shutdown();
            Err(HostError::Aborted("interrupted".into()))
        }
    };
    host.shutdown();
    if let Err(e) = logger.await {
        error!(error = %e, "Event logger task failed");
    }

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Load pass did not finish");
            return Err(e.into());
        }
    };

    for entry in &report.entries {
        match &entry.status {
            ModStatus::Loaded => info!(index = entry.index, name = %entry.name, "Loaded"),
            ModStatus::Failed => warn!(index = entry.index, name = %entry.name, "Failed"),
            ModStatus::Skipped(reason) => {
                warn!(index = entry.index, name = %entry.name, reason = %reason, "Skipped")
            }
        }
    }
    info!(
        loaded = report.loaded(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Mod host finished"
    );

    Ok(())
}
