//! VFS Module
//!
//! The capability contract the hosting engine opens files through, and the
//! in-memory implementation of it.
//!
//! ## Architecture
//! - `MemVfs` resolves names: `/name` → registry, anything else → private
//! - `MemFile` is one handle; lock level and read-only flag are per handle
//! - Storage and lock state live in the shared `Database`

mod file;
mod flags;
mod memvfs;
mod traits;

pub use file::MemFile;
pub use flags::{AccessFlags, DeviceCharacteristics, OpenFlags, SyncFlags};
pub use memvfs::{MemVfs, SHARED_PREFIX};
pub use traits::{Vfs, VfsFile};
