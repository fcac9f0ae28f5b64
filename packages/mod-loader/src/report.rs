use serde::Serialize;

use crate::manifest::{ModManifest, ModType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModStatus {
    /// Fetched, applied and, if it asked for it, reported ready.
    Loaded,
    /// Fetch, apply or ready wait failed.
    Failed,
    /// Never dispatched to a loader.
    Skipped(String),
}

/// Outcome of one manifest in a load pass.
#[derive(Debug, Clone, Serialize)]
pub struct ModLoadEntry {
    pub index: usize,
    pub name: String,
    pub mod_type: ModType,
    pub status: ModStatus,
}

impl ModLoadEntry {
    pub fn new(index: usize, manifest: &ModManifest, status: ModStatus) -> Self {
        Self {
            index,
            name: manifest.name.clone(),
            mod_type: manifest.mod_type.clone(),
            status,
        }
    }
}

/// Per-manifest outcomes of a load pass, in load order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub entries: Vec<ModLoadEntry>,
}

impl LoadReport {
    pub fn push(&mut self, entry: ModLoadEntry) {
        self.entries.push(entry);
    }

    pub fn loaded(&self) -> usize {
        self.count(|status| matches!(status, ModStatus::Loaded))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ModStatus::Failed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ModStatus::Skipped(_)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn count(&self, pred: impl Fn(&ModStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}
