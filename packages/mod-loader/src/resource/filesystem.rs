use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::traits::{FetchResponse, ResourceFetcher};
use crate::error::FetchError;

/// Serves the custom UI scheme from a mods directory on disk.
///
/// `coui://kill-tracker/main.js` maps to `{root}/kill-tracker/main.js`.
pub struct FilesystemFetcher {
    scheme: String,
    root: PathBuf,
    max_size: u64,
}

impl FilesystemFetcher {
    /// Create a fetcher rooted at `root`. The root must exist.
    pub async fn new(
        scheme: impl Into<String>,
        root: impl AsRef<Path>,
        max_size: u64,
    ) -> Result<Self, FetchError> {
        let root = fs::canonicalize(root.as_ref()).await?;
        Ok(Self {
            scheme: scheme.into(),
            root,
            max_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical path for `relative`, `None` when nothing exists there.
    async fn resolve(&self, relative: &str) -> Result<Option<PathBuf>, FetchError> {
        let candidate = self.root.join(relative.trim_start_matches('/'));
        let canonical = match fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(canonical))
    }
}

#[async_trait]
impl ResourceFetcher for FilesystemFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let relative = url
            .strip_prefix(&self.scheme)
            .ok_or_else(|| FetchError::UnsupportedScheme(url.to_string()))?;

        let Some(path) = self.resolve(relative).await? else {
            debug!(url, "Entry resource not found");
            return Ok(FetchResponse::not_found());
        };

        // Prevent path traversal out of the mods directory
        if !path.starts_with(&self.root) {
            return Ok(FetchResponse::status_only(403, "Forbidden"));
        }

        let meta = fs::metadata(&path).await?;
        if !meta.is_file() {
            return Ok(FetchResponse::not_found());
        }
        if meta.len() > self.max_size {
            return Ok(FetchResponse::status_only(413, "Payload Too Large"));
        }

        let body = fs::read(&path).await?;
        Ok(FetchResponse::ok(body))
    }
}
