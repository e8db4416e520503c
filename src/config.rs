//! Configuration for cowvfs
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Main configuration for a MemVfs instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------
    /// Name the VFS reports to the hosting engine
    pub vfs_name: String,

    // -------------------------------------------------------------------------
    // Locking
    // -------------------------------------------------------------------------
    /// How long an EXCLUSIVE lock request waits for other readers to drain
    /// before failing with `BusyRecovery`
    pub exclusive_lock_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vfs_name: "memdb".to_string(),
            exclusive_lock_timeout: Duration::from_micros(250),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the name reported to the engine
    pub fn vfs_name(mut self, name: impl Into<String>) -> Self {
        self.config.vfs_name = name.into();
        self
    }

    /// Set the EXCLUSIVE lock deadline
    pub fn exclusive_lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.exclusive_lock_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
