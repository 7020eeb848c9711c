//! Filter list sources.
//!
//! Loaders turn a source identifier (local path, URL, or in-memory key) into raw
//! filter lines. They know nothing about filter syntax.

#[cfg(feature = "download")]
mod auto_loader;
mod loader;

#[cfg(feature = "download")]
pub use auto_loader::AutoListLoader;
pub use loader::{
    is_remote_source, FileListLoader, ListLoader, MemoryListLoader, NilListLoader,
    DEFAULT_UPDATE_INTERVAL,
};
