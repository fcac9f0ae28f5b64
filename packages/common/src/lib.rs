pub mod config;
pub mod event;

pub use config::LoaderConfig;
pub use event::{EngineEvent, Event};
