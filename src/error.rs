//! Error types for cowvfs
//!
//! Provides a unified error type for all VFS operations, with a mapping to
//! the engine's extended result codes.

use std::time::Duration;

use thiserror::Error;

use crate::lock::LockLevel;

/// Result type alias using VfsError
pub type Result<T> = std::result::Result<T, VfsError>;

// =============================================================================
// Engine Result Codes
// =============================================================================

/// `SQLITE_BUSY`
pub const CODE_BUSY: i32 = 5;
/// `SQLITE_IOERR`
pub const CODE_IOERR: i32 = 10;
/// `SQLITE_CANTOPEN`
pub const CODE_CANTOPEN: i32 = 14;
/// `SQLITE_MISUSE`
pub const CODE_MISUSE: i32 = 21;
/// `SQLITE_BUSY_RECOVERY`
pub const CODE_BUSY_RECOVERY: i32 = CODE_BUSY | (1 << 8);
/// `SQLITE_IOERR_READ`
pub const CODE_IOERR_READ: i32 = CODE_IOERR | (1 << 8);
/// `SQLITE_IOERR_WRITE`
pub const CODE_IOERR_WRITE: i32 = CODE_IOERR | (3 << 8);
/// `SQLITE_IOERR_LOCK`
pub const CODE_IOERR_LOCK: i32 = CODE_IOERR | (15 << 8);

/// Unified error type for cowvfs operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    // -------------------------------------------------------------------------
    // Open Errors
    // -------------------------------------------------------------------------
    #[error("cannot open {name:?}: {reason}")]
    CannotOpen { name: String, reason: &'static str },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("read at negative offset {offset}")]
    IoRead { offset: i64 },

    #[error("write at negative offset {offset}")]
    IoWrite { offset: i64 },

    #[error("short write: {written} of {requested} bytes fit in the block")]
    ShortWrite { written: usize, requested: usize },

    // -------------------------------------------------------------------------
    // Locking Errors
    // -------------------------------------------------------------------------
    #[error("database is busy, cannot acquire {requested:?} lock")]
    Busy { requested: LockLevel },

    #[error("exclusive lock not acquired after {waited:?}, readers still active")]
    BusyRecovery { waited: Duration },

    #[error("read-only handle cannot acquire {requested:?} lock")]
    IoLock { requested: LockLevel },

    // -------------------------------------------------------------------------
    // Handle Errors
    // -------------------------------------------------------------------------
    #[error("file handle is closed")]
    Closed,
}

impl VfsError {
    /// Extended result code the hosting engine expects for this error
    pub fn code(&self) -> i32 {
        match self {
            VfsError::CannotOpen { .. } => CODE_CANTOPEN,
            VfsError::IoRead { .. } => CODE_IOERR_READ,
            VfsError::IoWrite { .. } | VfsError::ShortWrite { .. } => CODE_IOERR_WRITE,
            VfsError::Busy { .. } => CODE_BUSY,
            VfsError::BusyRecovery { .. } => CODE_BUSY_RECOVERY,
            VfsError::IoLock { .. } => CODE_IOERR_LOCK,
            VfsError::Closed => CODE_MISUSE,
        }
    }

    /// Primary result code (low byte of the extended code)
    pub fn primary_code(&self) -> i32 {
        self.code() & 0xff
    }

    /// True for both busy variants; the caller may retry later
    pub fn is_busy(&self) -> bool {
        matches!(self, VfsError::Busy { .. } | VfsError::BusyRecovery { .. })
    }

    pub(crate) fn cannot_open(name: impl Into<String>, reason: &'static str) -> Self {
        VfsError::CannotOpen {
            name: name.into(),
            reason,
        }
    }
}
