use std::sync::Arc;

use common::LoaderConfig;
use common::event::{Event, LOAD_MODS, LoadCompleteEvent, LoadModsEvent, LoadStartEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::bridge::EventBus;
use crate::host::UiHost;
use crate::loaders::{LoaderContext, load_script, load_style, load_theme, load_widget};
use crate::manifest::{ModManifest, ModType, parse_manifests};
use crate::report::{LoadReport, ModLoadEntry, ModStatus};
use crate::resource::ResourceFetcher;
use crate::session::LoadSession;

/// Loads mods one after another, in manifest order.
///
/// A mod is fully settled (including its ready wait) and its completion
/// event emitted before the next one is dispatched.
pub struct ModLoader {
    ctx: LoaderContext,
    session: Arc<LoadSession>,
}

impl ModLoader {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        ui: Arc<dyn UiHost>,
        bus: EventBus,
        config: LoaderConfig,
        session: Arc<LoadSession>,
    ) -> Self {
        let ctx = LoaderContext {
            fetcher,
            ui,
            bus,
            config,
            cancel: session.cancel_token().clone(),
        };
        Self { ctx, session }
    }

    pub fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn session(&self) -> &LoadSession {
        &self.session
    }

    /// Run the session's load pass.
    ///
    /// Returns `None` without emitting anything when the session already ran
    /// a pass or when `manifests_json` is not a manifest list.
    #[instrument(skip_all)]
    pub async fn load_mods(&self, manifests_json: &str) -> Option<LoadReport> {
        if !self.session.try_begin() {
            debug!("Mods already loaded this session");
            return None;
        }

        let manifests = match parse_manifests(manifests_json) {
            Ok(manifests) => manifests,
            Err(e) => {
                warn!(error = %e, "loadMods failed to parse manifests");
                return None;
            }
        };

        info!(count = manifests.len(), "Loading mods");
        let mut report = LoadReport::default();

        for (index, manifest) in manifests.iter().enumerate() {
            let Some(loader) = loader_for(manifest) else {
                if self.ctx.config.report_unknown_as_failed {
                    self.ctx.bus.trigger(&LoadStartEvent { index });
                    self.ctx.bus.trigger(&LoadCompleteEvent {
                        index,
                        success: false,
                    });
                }
                report.push(ModLoadEntry::new(
                    index,
                    manifest,
                    ModStatus::Skipped(format!("unknown mod type '{}'", manifest.mod_type)),
                ));
                continue;
            };

            self.ctx.bus.trigger(&LoadStartEvent { index });
            let success = self.dispatch(loader, manifest).await;
            self.ctx.bus.trigger(&LoadCompleteEvent { index, success });

            let status = if success {
                ModStatus::Loaded
            } else {
                ModStatus::Failed
            };
            report.push(ModLoadEntry::new(index, manifest, status));
        }

        info!(
            loaded = report.loaded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Finished loading mods"
        );
        Some(report)
    }

    /// Load a single mod without emitting lifecycle events. `None` when its
    /// type has no loader.
    pub async fn load_mod(&self, manifest: &ModManifest) -> Option<bool> {
        let loader = loader_for(manifest)?;
        Some(self.dispatch(loader, manifest).await)
    }

    #[instrument(skip_all, fields(mod_name = %manifest.name, mod_type = %manifest.mod_type))]
    async fn dispatch(&self, loader: Loader, manifest: &ModManifest) -> bool {
        let ctx = &self.ctx;
        let success = match loader {
            Loader::Style => load_style(ctx, manifest).await,
            Loader::Theme => load_theme(ctx, manifest).await,
            Loader::Widget => load_widget(ctx, manifest).await,
            Loader::Script => load_script(ctx, manifest).await,
        };
        info!(success, "Mod settled");
        success
    }

    /// Start a load pass on a background task. The caller does not need to
    /// observe it.
    pub fn spawn_load_mods(
        self: &Arc<Self>,
        manifests_json: String,
    ) -> JoinHandle<Option<LoadReport>> {
        let loader = Arc::clone(self);
        tokio::spawn(async move { loader.load_mods(&manifests_json).await })
    }

    /// Listen for `loadMods` from the client and start a pass for each one.
    /// Repeats are harmless: the session allows a single pass.
    ///
    /// The listener ends when the bus closes or the session shuts down.
    pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
        let loader = Arc::clone(self);
        let mut rx = loader.ctx.bus.subscribe();
        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = loader.ctx.cancel.cancelled() => break,
                    received = rx.recv() => received,
                };
                match received {
                    Ok(event) if event.is(LOAD_MODS) => {
                        match LoadModsEvent::from_engine_event(&event) {
                            Ok(LoadModsEvent { manifests }) => {
                                loader.spawn_load_mods(manifests);
                            }
                            Err(e) => warn!(error = %e, "Ignoring malformed loadMods event"),
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Mod loader listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Loader {
    Style,
    Theme,
    Widget,
    Script,
}

fn loader_for(manifest: &ModManifest) -> Option<Loader> {
    match &manifest.mod_type {
        ModType::Style => Some(Loader::Style),
        ModType::Theme => Some(Loader::Theme),
        ModType::Widget => Some(Loader::Widget),
        ModType::Script | ModType::TotalConversion => Some(Loader::Script),
        ModType::Unknown(tag) => {
            warn!(
                "Attempted to load a mod with an invalid type. type: {} | name: {}",
                tag, manifest.name
            );
            None
        }
    }
}
