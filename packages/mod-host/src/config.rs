use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::LoaderConfig;

/// Headless host configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    /// Directory served under the UI scheme. Default: "./mods".
    #[serde(default = "default_mods_dir")]
    pub mods_dir: PathBuf,
    /// JSON manifest list to load. Default: "./mods/manifests.json".
    #[serde(default = "default_manifests")]
    pub manifests: PathBuf,
    /// Program that runs script mods, fed the script on stdin. Default: "node".
    #[serde(default = "default_script_interpreter")]
    pub script_interpreter: String,
    /// Extra arguments for the interpreter. Default: none.
    #[serde(default)]
    pub script_args: Vec<String>,
    /// Largest entry file served, in bytes. Default: 10 MiB.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
}

fn default_mods_dir() -> PathBuf {
    PathBuf::from("./mods")
}
fn default_manifests() -> PathBuf {
    PathBuf::from("./mods/manifests.json")
}
fn default_script_interpreter() -> String {
    "node".into()
}
fn default_max_entry_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            mods_dir: default_mods_dir(),
            manifests: default_manifests(),
            script_interpreter: default_script_interpreter(),
            script_args: Vec::new(),
            max_entry_bytes: default_max_entry_bytes(),
        }
    }
}

/// Host application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HostAppConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl HostAppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("MOD_HOST_CONFIG").unwrap_or_else(|_| "config/mod-host".to_string());

        let s = Config::builder()
            .set_default("host.mods_dir", "./mods")?
            .set_default("host.manifests", "./mods/manifests.json")?
            .set_default("host.script_interpreter", "node")?
            .set_default("loader.scheme", "coui://")?
            .set_default("loader.style_container", "style-mods")?
            .set_default("loader.ready_timeout_secs", 30_i64)?
            .set_default("loader.report_unknown_as_failed", false)?
            // Load from config/mod-host.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., MOD_HOST__LOADER__READY_TIMEOUT_SECS)
            .add_source(Environment::with_prefix("MOD_HOST").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
