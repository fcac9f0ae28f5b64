use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{FetchResponse, ResourceFetcher};
use crate::error::FetchError;

enum Canned {
    Response(FetchResponse),
    Transport(String),
}

/// Fixed set of responses keyed by full URL. Unknown URLs answer 404.
/// Every requested URL is recorded in order.
#[derive(Clone, Default)]
pub struct MemoryFetcher {
    responses: Arc<Mutex<HashMap<String, Canned>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`.
    pub fn with_text(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, FetchResponse::ok(body.into()))
    }

    pub fn with_response(self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.into(), Canned::Response(response));
        self
    }

    /// Fail requests to `url` at the transport level.
    pub fn with_transport_error(self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.into(), Canned::Transport(reason.into()));
        self
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        let responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match responses.get(url) {
            Some(Canned::Response(response)) => Ok(response.clone()),
            Some(Canned::Transport(reason)) => Err(FetchError::Transport(reason.clone())),
            None => Ok(FetchResponse::not_found()),
        }
    }
}
