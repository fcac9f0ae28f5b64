use async_trait::async_trait;

use crate::error::FetchError;

/// Build the request URL for a mod entry. The entry is appended as-is: mod
/// content is trusted to come from the host's own distribution mechanism.
pub fn entry_url(scheme: &str, entry: &str) -> String {
    format!("{scheme}{entry}")
}

/// A completed request, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "OK", body)
    }

    /// Response with an empty body.
    pub fn status_only(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self::status_only(404, "Not Found")
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consume the body as UTF-8 text.
    pub fn text(self) -> Result<String, FetchError> {
        Ok(String::from_utf8(self.body)?)
    }
}

/// Retrieves entry resources for the custom UI scheme.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Perform a single request. A non-success status is still `Ok`; `Err`
    /// is reserved for transport failures.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
