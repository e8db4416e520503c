//! Lock state shared by every handle on one database
//!
//! Guarded by its own mutex, independent of the data lock.

use std::time::{Duration, Instant};

use crossbeam::utils::Backoff;
use parking_lot::{Mutex, MutexGuard};

use crate::error::{Result, VfsError};

use super::LockLevel;

/// Aggregate lock counters for a database
#[derive(Debug, Default)]
struct LockCounters {
    /// Handles holding SHARED or above
    shared: u32,

    /// Some handle holds RESERVED or above
    reserved: bool,

    /// Some handle holds PENDING or above
    pending: bool,
}

/// Lock-state domain of a database
///
/// Handles pass in the level they currently hold; the state machine updates
/// both the aggregate counters and the handle's level.
#[derive(Debug, Default)]
pub struct LockState {
    counters: Mutex<LockCounters>,
}

impl LockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `held` to `target`
    ///
    /// No-op when `held` is already at or above `target`. An EXCLUSIVE request
    /// first takes PENDING, then waits up to `timeout` for other SHARED holders
    /// to leave. On timeout the handle keeps PENDING and the caller gets
    /// `BusyRecovery`. Any other failure leaves the handle and the counters
    /// as they were.
    pub fn lock(
        &self,
        held: &mut LockLevel,
        target: LockLevel,
        read_only: bool,
        timeout: Duration,
    ) -> Result<()> {
        if *held >= target {
            return Ok(());
        }
        if read_only && target >= LockLevel::Reserved {
            return Err(VfsError::IoLock { requested: target });
        }

        let mut counters = self.counters.lock();

        // Every level above NONE implies a SHARED lock; take it first so the
        // shared count stays balanced on unlock.
        let implied_shared = *held == LockLevel::None && target > LockLevel::Shared;
        if implied_shared {
            if counters.pending {
                return Err(VfsError::Busy { requested: target });
            }
            counters.shared += 1;
            *held = LockLevel::Shared;
        }

        if let Err(e) = Self::raise(&mut counters, held, target, timeout) {
            if implied_shared && *held == LockLevel::Shared {
                counters.shared -= 1;
                *held = LockLevel::None;
            }
            return Err(e);
        }

        tracing::trace!(from = ?*held, to = ?target, "lock acquired");
        *held = target;
        Ok(())
    }

    /// Update the counters for raising `held` to `target`
    fn raise(
        counters: &mut MutexGuard<'_, LockCounters>,
        held: &mut LockLevel,
        target: LockLevel,
        timeout: Duration,
    ) -> Result<()> {
        match target {
            LockLevel::None => {}
            LockLevel::Shared => {
                if counters.pending {
                    return Err(VfsError::Busy { requested: target });
                }
                counters.shared += 1;
            }
            LockLevel::Reserved => {
                if counters.reserved {
                    return Err(VfsError::Busy { requested: target });
                }
                counters.reserved = true;
            }
            LockLevel::Pending => {
                counters.pending = true;
            }
            LockLevel::Exclusive => {
                if *held < LockLevel::Pending {
                    counters.pending = true;
                    *held = LockLevel::Pending;
                }
                // Our own SHARED lock is the only one allowed to remain.
                Self::wait_for_readers(counters, 1, timeout)?;
            }
        }
        Ok(())
    }

    /// Lower `held` to `target`
    ///
    /// No-op when `held` is already at or below `target`.
    pub fn unlock(&self, held: &mut LockLevel, target: LockLevel) {
        if *held <= target {
            return;
        }

        let mut counters = self.counters.lock();
        let old = *held;

        if old >= LockLevel::Pending && target < LockLevel::Pending {
            counters.pending = false;
        }
        if old >= LockLevel::Reserved && target < LockLevel::Reserved {
            counters.reserved = false;
        }
        if old >= LockLevel::Shared && target < LockLevel::Shared {
            counters.shared = counters.shared.saturating_sub(1);
        }

        tracing::trace!(from = ?old, to = ?target, "lock released");
        *held = target;
    }

    /// True if any handle holds RESERVED, or `held` is EXCLUSIVE
    pub fn check_reserved(&self, held: LockLevel) -> bool {
        let counters = self.counters.lock();
        counters.reserved || held >= LockLevel::Exclusive
    }

    /// Number of handles currently holding SHARED or above
    pub fn shared_holders(&self) -> u32 {
        self.counters.lock().shared
    }

    /// Whether some handle holds RESERVED
    pub fn is_reserved(&self) -> bool {
        self.counters.lock().reserved
    }

    /// Whether some handle holds PENDING
    pub fn is_pending(&self) -> bool {
        self.counters.lock().pending
    }

    /// Poll until at most `allowed` SHARED holders remain
    ///
    /// The mutex is released while backing off so readers can unlock.
    fn wait_for_readers(
        counters: &mut MutexGuard<'_, LockCounters>,
        allowed: u32,
        timeout: Duration,
    ) -> Result<()> {
        let started = Instant::now();
        let backoff = Backoff::new();

        while counters.shared > allowed {
            let waited = started.elapsed();
            if waited > timeout {
                tracing::warn!(
                    readers = counters.shared - allowed,
                    ?waited,
                    "exclusive lock timed out waiting for readers"
                );
                return Err(VfsError::BusyRecovery { waited });
            }
            MutexGuard::unlocked(counters, || backoff.snooze());
        }

        Ok(())
    }
}
