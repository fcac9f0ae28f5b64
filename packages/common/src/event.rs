use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Fired by the game client with the ordered manifest list as a JSON string.
pub const LOAD_MODS: &str = "loadMods";
/// Emitted before the manifest at `index` is dispatched.
pub const LOAD_START: &str = "mod-loader_load-start";
/// Emitted after the manifest at `index` settles, with its outcome.
pub const LOAD_COMPLETE: &str = "mod-loader_load-complete";
/// Broadcast of a theme payload for the UI to apply.
pub const LOAD_THEME: &str = "mod-loader_load-theme";
/// Broadcast of widget markup for the HUD to wrap and mount.
pub const LOAD_WIDGET: &str = "mod-loader_load-widget";

/// An event as it crosses the engine bridge: a name plus positional arguments,
/// the same shape as `engine.trigger(name, ...args)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl EngineEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Push one more positional argument.
    pub fn arg(mut self, value: impl Serialize) -> Self {
        self.args
            .push(serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    /// Decode the positional argument at `position`.
    pub fn arg_at<T: DeserializeOwned>(&self, position: usize) -> anyhow::Result<T> {
        let value = self.args.get(position).cloned().ok_or_else(|| {
            anyhow!(
                "event '{}' has no argument at position {}",
                self.name,
                position
            )
        })?;
        serde_json::from_value(value)
            .with_context(|| format!("event '{}' argument {} has the wrong shape", self.name, position))
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Typed view over an [`EngineEvent`].
pub trait Event: Send + Sync + Sized {
    /// Name the event is triggered under.
    fn name(&self) -> &str;

    /// Positional arguments in the order the engine delivers them.
    fn args(&self) -> Vec<Value>;

    fn to_engine_event(&self) -> EngineEvent {
        EngineEvent::with_args(self.name(), self.args())
    }

    /// Decode a typed event, failing on a name or argument mismatch.
    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self>;
}

impl Event for EngineEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn args(&self) -> Vec<Value> {
        self.args.clone()
    }

    fn to_engine_event(&self) -> EngineEvent {
        self.clone()
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        Ok(e.clone())
    }
}

/// Ensure `e` carries the expected name before decoding its arguments.
pub fn expect_name(e: &EngineEvent, expected: &str) -> anyhow::Result<()> {
    if e.name != expected {
        return Err(anyhow!(
            "expected event '{}', got '{}'",
            expected,
            e.name
        ));
    }
    Ok(())
}

/// `loadMods(manifests)`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadModsEvent {
    pub manifests: String,
}

impl Event for LoadModsEvent {
    fn name(&self) -> &str {
        LOAD_MODS
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::String(self.manifests.clone())]
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        expect_name(e, LOAD_MODS)?;
        Ok(Self {
            manifests: e.arg_at(0)?,
        })
    }
}

/// `mod-loader_load-start(index)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStartEvent {
    pub index: usize,
}

impl Event for LoadStartEvent {
    fn name(&self) -> &str {
        LOAD_START
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.index)]
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        expect_name(e, LOAD_START)?;
        Ok(Self { index: e.arg_at(0)? })
    }
}

/// `mod-loader_load-complete(index, success)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCompleteEvent {
    pub index: usize,
    pub success: bool,
}

impl Event for LoadCompleteEvent {
    fn name(&self) -> &str {
        LOAD_COMPLETE
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.index), Value::Bool(self.success)]
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        expect_name(e, LOAD_COMPLETE)?;
        Ok(Self {
            index: e.arg_at(0)?,
            success: e.arg_at(1)?,
        })
    }
}
