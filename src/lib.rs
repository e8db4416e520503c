//! # cowvfs
//!
//! A copy-on-write, in-memory virtual filesystem for an embedded SQL engine:
//! - Block-addressable storage over a persistent (immutable) block map
//! - Named databases shared by every connection in the process
//! - O(1) forks that share blocks until either side writes
//! - The engine's five-level lock protocol, emulated in-process
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SQL engine (consumer)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ open / read / write / lock
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  MemVfs  ──►  MemFile (per handle)          │
//! └──────────┬──────────────────────────┬───────────────────────┘
//!            │ "/name"                  │ private name
//!            ▼                          │
//!   ┌─────────────────┐                 │
//!   │    Registry     │                 │
//!   │ name → Database │                 │
//!   └────────┬────────┘                 │
//!            ▼                          ▼
//!   ┌──────────────────────────────────────────┐
//!   │                Database                  │
//!   │  RwLock{BlockMap, size}   Mutex{locks}   │
//!   └────────────────────┬─────────────────────┘
//!                        ▼
//!               ┌─────────────────┐
//!               │    BlockMap     │  shared by forks
//!               │ (im::OrdMap)    │
//!               └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod lock;
pub mod registry;
pub mod vfs;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, VfsError};
pub use config::Config;
pub use lock::LockLevel;
pub use registry::{create, delete, fork, Registry, TestDb};
pub use storage::{Database, ReadOutcome, BLOCK_SIZE};
pub use vfs::{MemFile, MemVfs, OpenFlags, Vfs, VfsFile};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cowvfs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
