use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// State scoped to one UI session.
///
/// Mods are loaded at most once per session no matter how often the client
/// asks. Ending the session cancels any ready wait still in flight.
#[derive(Debug, Default)]
pub struct LoadSession {
    started: AtomicBool,
    cancel: CancellationToken,
}

impl LoadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session's single load pass. `true` for the first caller
    /// only; the flag is never reset.
    pub fn try_begin(&self) -> bool {
        !self.started.swap(true, Ordering::AcqRel)
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// End the session. Pending ready waits fail with `Cancelled`.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
