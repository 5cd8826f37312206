use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use ap_core::{Error, LinkStore, Result};

pub mod backends;
pub mod stats;

pub use backends::*;
pub use stats::StatsLog;

/// Which link store backs the published-link set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {}. Available backends: file, memory",
                other
            ))),
        }
    }
}

pub fn create_link_store(kind: StoreKind, path: &Path) -> Arc<dyn LinkStore> {
    match kind {
        StoreKind::File => Arc::new(FileLinkStore::new(path)),
        StoreKind::Memory => Arc::new(MemoryLinkStore::new()),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::stats::StatsLog;
    pub use super::{create_link_store, StoreKind};
}
