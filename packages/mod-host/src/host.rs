use std::path::Path;
use std::sync::Arc;

use common::event::{EngineEvent, LOAD_COMPLETE, LOAD_START};
use mod_loader::{EventBus, FilesystemFetcher, LoadReport, LoadSession, ModLoader, StyleDocument};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::HostAppConfig;
use crate::error::{HostError, Result};
use crate::script::ProcessUi;

const EVENT_PREFIX: &str = "mod-loader_";

/// A headless UI: mods served from disk, styles kept in memory, scripts run
/// in an external interpreter.
pub struct Host {
    loader: Arc<ModLoader>,
    ui: ProcessUi,
    bus: EventBus,
}

impl Host {
    pub async fn build(config: &HostAppConfig) -> Result<Self> {
        let fetcher = FilesystemFetcher::new(
            config.loader.scheme.clone(),
            &config.host.mods_dir,
            config.host.max_entry_bytes,
        )
        .await?;
        info!(root = %fetcher.root().display(), "Serving mods");

        let bus = EventBus::new(config.loader.event_capacity);
        let ui = ProcessUi::new(
            StyleDocument::with_containers([config.loader.style_container.clone()]),
            config.host.script_interpreter.clone(),
            config.host.script_args.clone(),
            bus.clone(),
        );
        let loader = Arc::new(ModLoader::new(
            Arc::new(fetcher),
            Arc::new(ui.clone()),
            bus.clone(),
            config.loader.clone(),
            Arc::new(LoadSession::new()),
        ));

        Ok(Self { loader, ui, bus })
    }

    pub fn loader(&self) -> &Arc<ModLoader> {
        &self.loader
    }

    pub fn ui(&self) -> &ProcessUi {
        &self.ui
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Log lifecycle events until the session shuts down. Events already
    /// buffered when it does are still logged. Resolves to the number of
    /// events logged.
    pub fn spawn_event_logger(&self) -> JoinHandle<usize> {
        let mut rx = self.bus.subscribe();
        let cancel = self.loader.session().cancel_token().clone();
        tokio::spawn(async move {
            let mut logged = 0;
            loop {
                let received = tokio::select! {
                    biased;
                    received = rx.recv() => received,
                    _ = cancel.cancelled() => break,
                };
                match received {
                    Ok(event) => {
                        log_event(&event);
                        logged += 1;
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
            logged
        })
    }

    /// Read a manifest list and run the session's load pass with it.
    pub async fn run(&self, manifests_path: &Path) -> Result<LoadReport> {
        let manifests = tokio::fs::read_to_string(manifests_path)
            .await
            .map_err(|source| HostError::Manifests {
                path: manifests_path.display().to_string(),
                source,
            })?;

        self.loader
            .load_mods(&manifests)
            .await
            .ok_or_else(|| HostError::Aborted("manifest list rejected".into()))
    }

    pub fn shutdown(&self) {
        self.loader.session().shutdown();
    }
}

fn log_event(event: &EngineEvent) {
    match event.name.as_str() {
        LOAD_START | LOAD_COMPLETE => info!(event = %event.name, args = ?event.args, "Lifecycle"),
        name if name.starts_with(EVENT_PREFIX) => info!(event = %name, "Mod event"),
        _ => debug!(event = %event.name, "Event"),
    }
}
