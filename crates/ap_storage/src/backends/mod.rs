pub mod file;
pub mod memory;

pub use file::FileLinkStore;
pub use memory::MemoryLinkStore;
