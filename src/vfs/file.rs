//! File handle
//!
//! One consumer's view of a database: its own lock level and read-only flag
//! over a shared `Database`.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, VfsError};
use crate::lock::LockLevel;
use crate::registry::Registry;
use crate::storage::{Database, ReadOutcome, BLOCK_SIZE};

use super::flags::{DeviceCharacteristics, SyncFlags};
use super::traits::VfsFile;

/// A file handle opened by `MemVfs`
///
/// Dropping an open handle closes it.
#[derive(Debug)]
pub struct MemFile {
    /// Shared storage
    db: Arc<Database>,

    /// Set for shared databases; releases the registry reference on close
    registry: Option<Registry>,

    /// Lock level held by this handle
    level: LockLevel,

    read_only: bool,

    /// Deadline for EXCLUSIVE lock acquisition
    exclusive_timeout: Duration,

    closed: bool,
}

impl MemFile {
    pub(crate) fn new(
        db: Arc<Database>,
        registry: Option<Registry>,
        read_only: bool,
        exclusive_timeout: Duration,
    ) -> Self {
        Self {
            db,
            registry,
            level: LockLevel::None,
            read_only,
            exclusive_timeout,
            closed: false,
        }
    }

    /// The database behind this handle
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// True if the database lives in a registry
    pub fn is_shared(&self) -> bool {
        self.registry.is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(VfsError::Closed);
        }
        Ok(())
    }
}

impl VfsFile for MemFile {
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.db.locks().unlock(&mut self.level, LockLevel::None);
        if let Some(registry) = self.registry.take() {
            registry.release(&self.db);
        }
        self.closed = true;

        tracing::debug!(db = self.db.name(), "closed file");
        Ok(())
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<ReadOutcome> {
        self.ensure_open()?;
        self.db.read_at(buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: i64) -> Result<usize> {
        self.ensure_open()?;
        self.db.write_at(buf, offset)
    }

    fn truncate(&self, size: i64) -> Result<()> {
        self.ensure_open()?;
        self.db.truncate(size);
        Ok(())
    }

    fn sync(&self, _flags: SyncFlags) -> Result<()> {
        self.ensure_open()
    }

    fn size(&self) -> Result<i64> {
        self.ensure_open()?;
        Ok(self.db.size())
    }

    fn size_hint(&self, size: i64) -> Result<()> {
        self.ensure_open()?;
        self.db.size_hint(size);
        Ok(())
    }

    fn lock(&mut self, level: LockLevel) -> Result<()> {
        self.ensure_open()?;
        self.db
            .locks()
            .lock(&mut self.level, level, self.read_only, self.exclusive_timeout)
    }

    fn unlock(&mut self, level: LockLevel) -> Result<()> {
        self.ensure_open()?;
        self.db.locks().unlock(&mut self.level, level);
        Ok(())
    }

    fn check_reserved_lock(&self) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.db.locks().check_reserved(self.level))
    }

    fn lock_state(&self) -> LockLevel {
        self.level
    }

    fn sector_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn device_characteristics(&self) -> DeviceCharacteristics {
        DeviceCharacteristics::ATOMIC
            | DeviceCharacteristics::SEQUENTIAL
            | DeviceCharacteristics::SAFE_APPEND
            | DeviceCharacteristics::POWERSAFE_OVERWRITE
    }
}

impl Drop for MemFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(db = self.db.name(), error = %e, "failed to close file on drop");
        }
    }
}
