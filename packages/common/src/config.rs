use std::time::Duration;

use serde::Deserialize;

/// Mod loader configuration shared by the library and its hosts.
#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    /// Prefix prepended verbatim to every manifest `entry`. Default: "coui://".
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Id of the container style mods are appended to. Default: "style-mods".
    #[serde(default = "default_style_container")]
    pub style_container: String,
    /// Seconds to wait for a mod's ready event. 0 waits forever. Default: 30.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    /// Emit `load-start`/`load-complete(false)` for manifests with an unknown
    /// type instead of skipping them silently. Default: false.
    #[serde(default)]
    pub report_unknown_as_failed: bool,
    /// Buffered events per bus subscriber before it lags. Default: 256.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_scheme() -> String {
    "coui://".into()
}
fn default_style_container() -> String {
    "style-mods".into()
}
fn default_ready_timeout_secs() -> u64 {
    30
}
fn default_event_capacity() -> usize {
    256
}

impl LoaderConfig {
    /// Deadline for ready events, `None` when waiting is unbounded.
    pub fn ready_timeout(&self) -> Option<Duration> {
        match self.ready_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            style_container: default_style_container(),
            ready_timeout_secs: default_ready_timeout_secs(),
            report_unknown_as_failed: false,
            event_capacity: default_event_capacity(),
        }
    }
}
