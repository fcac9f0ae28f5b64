use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use crate::error::ApplyError;
use crate::manifest::ModManifest;

/// The live UI the loaders apply mods to.
///
/// `eval_script` runs mod code with the full privileges of the UI. Nothing
/// here sandboxes it; entry resources are expected to be vetted by whatever
/// distributed the mod.
pub trait UiHost: Send + Sync {
    /// Append `html` at the end of the element with id `container_id`.
    fn append_style(&self, container_id: &str, html: &str) -> Result<(), ApplyError>;

    /// Execute `source` in the UI's global scope.
    fn eval_script(&self, manifest: &ModManifest, source: &str) -> Result<(), ApplyError>;
}

/// Run a host call, turning a panic inside the host into an `ApplyError` so
/// one broken mod cannot take the loader down.
pub fn guard_apply<F>(apply: F) -> Result<(), ApplyError>
where
    F: FnOnce() -> Result<(), ApplyError>,
{
    match panic::catch_unwind(AssertUnwindSafe(apply)) {
        Ok(result) => result,
        Err(panic) => Err(ApplyError::Panicked(panic_message(panic))),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// Headless UI: named containers holding appended markup, plus a log of the
/// scripts handed to it. Scripts are recorded, not run.
#[derive(Debug, Clone, Default)]
pub struct StyleDocument {
    containers: Arc<RwLock<HashMap<String, String>>>,
    scripts: Arc<RwLock<Vec<(String, String)>>>,
}

impl StyleDocument {
    /// Document with the given (empty) containers.
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let containers = ids
            .into_iter()
            .map(|id| (id.into(), String::new()))
            .collect();
        Self {
            containers: Arc::new(RwLock::new(containers)),
            scripts: Arc::default(),
        }
    }

    /// Current markup of a container.
    pub fn inner_html(&self, container_id: &str) -> Option<String> {
        self.containers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(container_id)
            .cloned()
    }

    /// `(mod name, source)` for every script evaluated so far.
    pub fn scripts(&self) -> Vec<(String, String)> {
        self.scripts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl UiHost for StyleDocument {
    fn append_style(&self, container_id: &str, html: &str) -> Result<(), ApplyError> {
        let mut containers = self
            .containers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let container = containers
            .get_mut(container_id)
            .ok_or_else(|| ApplyError::MissingContainer(container_id.to_string()))?;
        container.push_str(html);
        Ok(())
    }

    fn eval_script(&self, manifest: &ModManifest, source: &str) -> Result<(), ApplyError> {
        self.scripts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((manifest.name.clone(), source.to_string()));
        Ok(())
    }
}
