//! Database
//!
//! A named logical file: block map, logical size, lock state and refcount.

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{Result, VfsError};
use crate::lock::LockState;

use super::{BlockMap, BLOCK_SIZE, BLOCK_SIZE_I64};

/// Outcome of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes placed in the buffer (including zero-fill for sparse ranges)
    pub len: usize,

    /// The read stopped because it reached the logical end of the file
    pub eof: bool,
}

impl ReadOutcome {
    fn complete(len: usize) -> Self {
        Self { len, eof: false }
    }

    fn end_of_file(len: usize) -> Self {
        Self { len, eof: true }
    }
}

/// Data domain: guarded together by one RwLock
#[derive(Debug, Clone, Default)]
struct DataState {
    blocks: BlockMap,
    size: i64,
}

/// Shared storage unit behind one or more handles
///
/// ## Concurrency:
/// - `data`: RwLock (many concurrent readers, exclusive writer)
/// - `locks`: its own mutex, never held together with `data`
/// - `refs`: only changed while the owning registry's lock is held
#[derive(Debug)]
pub struct Database {
    /// Registry key (empty for private databases)
    name: String,

    /// Block map root and logical size
    data: RwLock<DataState>,

    /// Engine lock protocol state
    locks: LockState,

    /// Open handles plus the registry's own hold for created databases
    refs: AtomicUsize,
}

impl Database {
    /// Create an empty database
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name, BlockMap::new(), 0, 0)
    }

    /// Create a database from initial contents
    ///
    /// Contents are sliced into full blocks in index order; the last block is
    /// zero-padded to `BLOCK_SIZE`.
    pub fn with_contents(name: impl Into<String>, contents: &[u8]) -> Self {
        let mut blocks = BlockMap::new();
        for (index, chunk) in contents.chunks(BLOCK_SIZE).enumerate() {
            let mut block = vec![0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            blocks = blocks.insert(index as u64, Bytes::from(block));
        }
        Self::from_parts(name, blocks, contents.len() as i64, 0)
    }

    /// Create a fork of `self` under `name`
    ///
    /// The block map is shared, not copied. The snapshot is taken under the
    /// data write lock so it is ordered with concurrent writers.
    pub fn fork(&self, name: impl Into<String>) -> Self {
        let (blocks, size) = self.snapshot();
        Self::from_parts(name, blocks, size, 1)
    }

    pub(crate) fn from_parts(
        name: impl Into<String>,
        blocks: BlockMap,
        size: i64,
        refs: usize,
    ) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(DataState { blocks, size }),
            locks: LockState::new(),
            refs: AtomicUsize::new(refs),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock-state domain shared by all handles
    pub fn locks(&self) -> &LockState {
        &self.locks
    }

    /// Logical size in bytes
    pub fn size(&self) -> i64 {
        self.data.read().size
    }

    /// Number of materialised blocks
    pub fn block_count(&self) -> usize {
        self.data.read().blocks.len()
    }

    /// Current block map root and size
    pub fn snapshot(&self) -> (BlockMap, i64) {
        let data = self.data.write();
        (data.blocks.clone(), data.size)
    }

    /// Current reference count
    pub fn refs(&self) -> usize {
        self.refs.load(Ordering::Acquire)
    }

    pub(crate) fn acquire_ref(&self) -> usize {
        self.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the remaining count
    pub(crate) fn release_ref(&self) -> usize {
        let prev = self
            .refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        prev.saturating_sub(1)
    }

    // =========================================================================
    // Block I/O
    // =========================================================================

    /// Read into `buf` starting at `offset`
    ///
    /// The read is capped at the end of the block containing `offset` and at
    /// the logical size. Missing or short blocks read as zeroes. `eof` is set
    /// only when the logical size cut the read short; the unfilled tail of
    /// `buf` is then zeroed.
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<ReadOutcome> {
        if offset < 0 {
            return Err(VfsError::IoRead { offset });
        }

        let data = self.data.read();

        if offset >= data.size {
            buf.fill(0);
            return Ok(ReadOutcome::end_of_file(0));
        }
        if buf.is_empty() {
            return Ok(ReadOutcome::complete(0));
        }

        let index = (offset / BLOCK_SIZE_I64) as u64;
        let within = (offset % BLOCK_SIZE_I64) as usize;

        let readable = (data.size - offset) as usize;
        let in_block = BLOCK_SIZE - within;
        let len = buf.len().min(readable).min(in_block);

        match data.blocks.get(index) {
            Some(block) if block.len() > within => {
                let stored = len.min(block.len() - within);
                buf[..stored].copy_from_slice(&block[within..within + stored]);
                buf[stored..len].fill(0);
            }
            _ => buf[..len].fill(0),
        }
        drop(data);

        if len < buf.len() && len == readable {
            buf[len..].fill(0);
            return Ok(ReadOutcome::end_of_file(len));
        }
        Ok(ReadOutcome::complete(len))
    }

    /// Write `buf` at `offset`
    ///
    /// A write that would cross a block boundary stores only the prefix that
    /// fits and fails with `ShortWrite`. A write whose end lies past
    /// `i64::MAX` fails with `IoWrite` and stores nothing.
    pub fn write_at(&self, buf: &[u8], offset: i64) -> Result<usize> {
        if offset < 0 {
            return Err(VfsError::IoWrite { offset });
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let index = (offset / BLOCK_SIZE_I64) as u64;
        let within = (offset % BLOCK_SIZE_I64) as usize;
        let fits = buf.len().min(BLOCK_SIZE - within);
        let end = offset
            .checked_add(fits as i64)
            .ok_or(VfsError::IoWrite { offset })?;

        let mut data = self.data.write();

        let mut block = vec![0u8; BLOCK_SIZE];
        if let Some(existing) = data.blocks.get(index) {
            block[..existing.len()].copy_from_slice(existing);
        }
        block[within..within + fits].copy_from_slice(&buf[..fits]);
        data.blocks = data.blocks.insert(index, Bytes::from(block));

        if end > data.size {
            data.size = end;
        }
        drop(data);

        if fits < buf.len() {
            return Err(VfsError::ShortWrite {
                written: fits,
                requested: buf.len(),
            });
        }
        Ok(fits)
    }

    /// Set the logical size, pruning blocks past the new end
    ///
    /// Negative sizes clamp to zero. Growth is sparse.
    pub fn truncate(&self, size: i64) {
        let mut data = self.data.write();
        Self::truncate_locked(&mut data, size);
    }

    /// Grow the logical size to `size`; never shrinks
    pub fn size_hint(&self, size: i64) {
        let mut data = self.data.write();
        if size > data.size {
            Self::truncate_locked(&mut data, size);
        }
    }

    fn truncate_locked(data: &mut DataState, size: i64) {
        let size = size.max(0);
        data.size = size;

        if size == 0 {
            data.blocks = BlockMap::new();
            return;
        }

        let last = ((size - 1) / BLOCK_SIZE_I64) as u64;
        let tail = (size - last as i64 * BLOCK_SIZE_I64) as usize;

        let mut blocks = data.blocks.retain_through(last);
        if let Some(existing) = blocks.get(last) {
            if existing.len() != tail {
                let mut shrunk = vec![0u8; tail];
                let keep = tail.min(existing.len());
                shrunk[..keep].copy_from_slice(&existing[..keep]);
                blocks = blocks.insert(last, Bytes::from(shrunk));
            }
        }
        data.blocks = blocks;
    }
}
