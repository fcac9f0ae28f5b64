mod traits;

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemFetcher;
pub use memory::MemoryFetcher;
pub use traits::{FetchResponse, ResourceFetcher, entry_url};
