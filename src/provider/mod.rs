//! File provider - the boundary to wherever manifest bytes live.
//!
//! The core never opens a network connection or touches the filesystem
//! directly; everything goes through this trait so discovery and patching
//! can run against a remote host, a local checkout, or an in-memory
//! fixture interchangeably.

mod local;

pub use local::LocalProvider;

use anyhow::Result;

/// A directory entry returned by [`FileProvider::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (single component, no separators)
    pub name: String,

    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Source of manifest file contents, keyed by repository-relative path.
///
/// Implementations must be `Sync`: discovery fans out reads within one
/// round across threads.
pub trait FileProvider: Sync {
    /// Read a file. `Ok(None)` means the file does not exist; `Err` is
    /// reserved for transport failures.
    fn read(&self, path: &str) -> Result<Option<String>>;

    /// List a directory (used for workspace member glob expansion).
    /// A missing directory lists as empty.
    fn list(&self, dir: &str) -> Result<Vec<DirEntry>>;

    /// Write a file, creating parent directories as needed.
    fn write(&self, path: &str, content: &str) -> Result<()>;
}
