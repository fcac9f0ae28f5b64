use std::sync::Arc;

use ::common::event::{
    EngineEvent, Event, LOAD_COMPLETE, LOAD_START, LoadCompleteEvent, LoadStartEvent,
};
use ::common::LoaderConfig;
use mod_loader::{
    ApplyError, EventBus, LoadSession, MemoryFetcher, ModLoader, ModManifest, StyleDocument,
    UiHost,
};
use tokio::sync::broadcast;

/// Lifecycle events as the host sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Start(usize),
    Complete(usize, bool),
}

/// UI host for tests. Behaves like a `StyleDocument`, and a script whose
/// body is `fire:<event>` triggers that event while it is being evaluated,
/// the way a mod announces readiness from its own startup code. A body of
/// `panic` makes the host panic.
#[derive(Clone)]
pub struct ScriptedUi {
    pub document: StyleDocument,
    bus: EventBus,
}

impl UiHost for ScriptedUi {
    fn append_style(&self, container_id: &str, html: &str) -> Result<(), ApplyError> {
        self.document.append_style(container_id, html)
    }

    fn eval_script(&self, manifest: &ModManifest, source: &str) -> Result<(), ApplyError> {
        if source == "panic" {
            panic!("script host crashed");
        }
        if source == "throw" {
            return Err(ApplyError::Script("SyntaxError".into()));
        }
        self.document.eval_script(manifest, source)?;
        if let Some(event) = source.strip_prefix("fire:") {
            self.bus.trigger(&EngineEvent::new(event));
        }
        Ok(())
    }
}

pub struct TestHost {
    pub loader: Arc<ModLoader>,
    pub fetcher: MemoryFetcher,
    pub ui: ScriptedUi,
    pub bus: EventBus,
    events: broadcast::Receiver<EngineEvent>,
}

impl TestHost {
    pub fn new(fetcher: MemoryFetcher) -> Self {
        Self::with_config(fetcher, LoaderConfig::default())
    }

    pub fn with_config(fetcher: MemoryFetcher, config: LoaderConfig) -> Self {
        let bus = EventBus::new(config.event_capacity);
        let ui = ScriptedUi {
            document: StyleDocument::with_containers([config.style_container.clone()]),
            bus: bus.clone(),
        };
        let events = bus.subscribe();
        let loader = Arc::new(ModLoader::new(
            Arc::new(fetcher.clone()),
            Arc::new(ui.clone()),
            bus.clone(),
            config,
            Arc::new(LoadSession::new()),
        ));
        Self {
            loader,
            fetcher,
            ui,
            bus,
            events,
        }
    }

    /// Drain every event observed so far.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            seen.push(event);
        }
        seen
    }

    /// Drain and keep only `load-start` / `load-complete`.
    pub fn lifecycle(&mut self) -> Vec<Lifecycle> {
        self.drain()
            .iter()
            .filter_map(|event| match event.name.as_str() {
                LOAD_START => LoadStartEvent::from_engine_event(event)
                    .ok()
                    .map(|e| Lifecycle::Start(e.index)),
                LOAD_COMPLETE => LoadCompleteEvent::from_engine_event(event)
                    .ok()
                    .map(|e| Lifecycle::Complete(e.index, e.success)),
                _ => None,
            })
            .collect()
    }

    /// Yield until the UI has evaluated `count` scripts.
    pub async fn wait_for_scripts(&self, count: usize) {
        while self.ui.document.scripts().len() < count {
            tokio::task::yield_now().await;
        }
    }
}
