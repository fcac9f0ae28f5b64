use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to read manifests from {path}: {source}")]
    Manifests {
        path: String,
        source: std::io::Error,
    },

    #[error("Mods directory unavailable: {0}")]
    ModsDir(#[from] mod_loader::FetchError),

    #[error("Load pass aborted: {0}")]
    Aborted(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
