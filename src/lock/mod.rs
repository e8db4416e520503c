//! Lock Module
//!
//! The engine's five-level file locking protocol, emulated in-process.
//!
//! ## Levels
//! ```text
//!   NONE ──► SHARED ──► RESERVED ──► PENDING ──► EXCLUSIVE
//!             (many)     (one)        (one,        (one, no other
//!                                   blocks new     SHARED holders)
//!                                    SHARED)
//! ```
//!
//! Each handle tracks the level it holds; the database aggregates the
//! shared-holder count and whether RESERVED and PENDING are taken.

mod state;

pub use state::LockState;

/// Lock level held by a handle, strictly ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LockLevel {
    /// No lock held
    #[default]
    None = 0,

    /// Reading
    Shared = 1,

    /// Intending to write; coexists with SHARED holders
    Reserved = 2,

    /// Waiting for SHARED holders to drain; blocks new readers
    Pending = 3,

    /// Writing
    Exclusive = 4,
}

impl LockLevel {
    /// Convert from the engine's numeric level
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LockLevel::None),
            1 => Some(LockLevel::Shared),
            2 => Some(LockLevel::Reserved),
            3 => Some(LockLevel::Pending),
            4 => Some(LockLevel::Exclusive),
            _ => None,
        }
    }
}
