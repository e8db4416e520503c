//! VFS capability contract
//!
//! Mirrors the engine's `sqlite3_vfs` and `sqlite3_io_methods` tables.

use crate::error::Result;
use crate::lock::LockLevel;
use crate::storage::ReadOutcome;

use super::flags::{AccessFlags, DeviceCharacteristics, OpenFlags, SyncFlags};

/// A virtual filesystem the engine opens files through
pub trait Vfs: Send + Sync {
    /// The file handle type produced by this VFS
    type File: VfsFile;

    /// Name the VFS is registered under
    fn name(&self) -> &str;

    /// Open a file
    ///
    /// Returns the handle and the flags that were actually applied.
    fn open(&self, name: &str, flags: OpenFlags) -> Result<(Self::File, OpenFlags)>;

    /// Delete a file by name
    fn delete(&self, name: &str, sync_dir: bool) -> Result<()>;

    /// Check whether a file exists or is accessible
    fn access(&self, name: &str, flags: AccessFlags) -> Result<bool>;

    /// Canonicalize a name
    fn full_pathname(&self, name: &str) -> Result<String>;
}

/// A file opened through a `Vfs`
pub trait VfsFile: Send + Sync {
    /// Release locks and the file's resources; later calls are no-ops
    fn close(&mut self) -> Result<()>;

    /// Read into `buf` from `offset`
    fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<ReadOutcome>;

    /// Write `buf` at `offset`, returning the bytes written
    fn write_at(&self, buf: &[u8], offset: i64) -> Result<usize>;

    /// Set the file size
    fn truncate(&self, size: i64) -> Result<()>;

    /// Flush to stable storage
    fn sync(&self, flags: SyncFlags) -> Result<()>;

    /// Current file size in bytes
    fn size(&self) -> Result<i64>;

    /// Hint that the file is about to grow to `size`
    fn size_hint(&self, _size: i64) -> Result<()> {
        Ok(())
    }

    /// Raise this handle's lock to `level`
    fn lock(&mut self, level: LockLevel) -> Result<()>;

    /// Lower this handle's lock to `level`
    fn unlock(&mut self, level: LockLevel) -> Result<()>;

    /// True if some handle holds a RESERVED lock on the file
    fn check_reserved_lock(&self) -> Result<bool>;

    /// The lock level this handle holds
    fn lock_state(&self) -> LockLevel;

    /// Minimum write granularity in bytes
    fn sector_size(&self) -> usize {
        4096
    }

    fn device_characteristics(&self) -> DeviceCharacteristics {
        DeviceCharacteristics::empty()
    }
}
