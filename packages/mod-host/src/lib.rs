pub mod config;
pub mod error;
pub mod host;
pub mod script;

pub use config::{HostAppConfig, HostConfig};
pub use error::{HostError, Result};
pub use host::Host;
pub use script::ProcessUi;
