//! Sequential loader for third-party UI mods.
//!
//! The game client hands over an ordered manifest list with `loadMods`; each
//! mod's entry resource is fetched over the UI scheme, applied to the live UI
//! and, when the mod asks for it, awaited until it reports ready. Mods load
//! strictly one at a time and a failing mod never stops the ones after it.

pub mod bridge;
pub mod error;
pub mod events;
pub mod host;
pub mod loaders;
pub mod manifest;
pub mod report;
pub mod resource;
pub mod runner;
pub mod session;

pub use bridge::{EventBus, ReadySignal};
pub use error::{ApplyError, FetchError, ModLoaderError, ReadyError};
pub use host::{StyleDocument, UiHost};
pub use manifest::{ModManifest, ModType, ModVersion, parse_manifests};
pub use report::{LoadReport, ModStatus};
pub use resource::{FetchResponse, FilesystemFetcher, MemoryFetcher, ResourceFetcher};
pub use runner::ModLoader;
pub use session::LoadSession;
