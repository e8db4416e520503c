//! Storage Module
//!
//! Block-addressable, copy-on-write storage for one logical file.
//!
//! ## Responsibilities
//! - Translate byte-range I/O into whole-block operations
//! - Never mutate an installed block; every change installs a new one
//! - Share block maps between forks without copying
//!
//! ## Layout
//! ```text
//! offset:  0            B            2B           3B
//!          ├────────────┼────────────┼────────────┼──────┤ size
//! blocks:  │  block 0   │ (absent =  │  block 2   │ blk 3│
//!          │  B bytes   │  zeroes)   │  B bytes   │ short│
//!          └────────────┴────────────┴────────────┴──────┘
//! ```
//! Only the highest block may be shorter than `BLOCK_SIZE`, and only after
//! a truncation.

mod block_map;
mod database;

pub use block_map::BlockMap;
pub use database::{Database, ReadOutcome};

/// Size of one block in bytes (64 KiB, the largest engine page size)
pub const BLOCK_SIZE: usize = 65536;

/// `BLOCK_SIZE` as a signed offset
pub(crate) const BLOCK_SIZE_I64: i64 = BLOCK_SIZE as i64;

const _: () = assert!(BLOCK_SIZE.is_power_of_two() && BLOCK_SIZE >= 512);
const _: () = assert!(BLOCK_SIZE % 65536 == 0);

/// Byte offset at which the engine stores its write/read format versions
pub const HEADER_FORMAT_OFFSET: usize = 18;

/// Format version marking rollback-journal mode
pub const FORMAT_ROLLBACK: u8 = 1;

/// Rewrite a WAL (or WAL2) header marker to rollback-journal mode
///
/// Returns true if the header was changed. Inputs shorter than the header
/// field are left alone.
pub fn force_rollback_journal(data: &mut [u8]) -> bool {
    let Some(marker) = data.get_mut(HEADER_FORMAT_OFFSET..HEADER_FORMAT_OFFSET + 2) else {
        return false;
    };
    match (marker[0], marker[1]) {
        (2, 2) | (3, 3) => {
            marker.fill(FORMAT_ROLLBACK);
            true
        }
        _ => false,
    }
}
