//! In-memory VFS
//!
//! Opens files as handles over registry-backed (shared) or private databases.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, VfsError};
use crate::registry::Registry;
use crate::storage::Database;

use super::file::MemFile;
use super::flags::{AccessFlags, OpenFlags};
use super::traits::Vfs;

/// Leading marker of a shared database name
pub const SHARED_PREFIX: char = '/';

/// Copy-on-write in-memory VFS
///
/// A name starting with `/` refers to a process-shared database in the
/// registry; any other name opens a fresh private database.
#[derive(Debug, Clone)]
pub struct MemVfs {
    config: Config,
    registry: Registry,
}

impl MemVfs {
    /// VFS over the global registry with default config
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// VFS over the global registry
    pub fn with_config(config: Config) -> Self {
        Self::with_registry(Registry::global().clone(), config)
    }

    /// VFS over its own registry
    pub fn with_registry(registry: Registry, config: Config) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry key for a shared name, or None for a private one
    fn shared_key(name: &str) -> Option<&str> {
        name.strip_prefix(SHARED_PREFIX).filter(|key| !key.is_empty())
    }
}

impl Default for MemVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs for MemVfs {
    type File = MemFile;

    fn name(&self) -> &str {
        &self.config.vfs_name
    }

    fn open(&self, name: &str, flags: OpenFlags) -> Result<(Self::File, OpenFlags)> {
        // Only these kinds are guaranteed to issue block-aligned I/O.
        // Returning MEMORY keeps the engine from asking for the others.
        if !flags.intersects(OpenFlags::SUPPORTED_KINDS) {
            return Err(VfsError::cannot_open(name, "unsupported file kind"));
        }

        let create = flags.contains(OpenFlags::CREATE);
        let read_only = flags.contains(OpenFlags::READONLY);

        let (db, registry) = match Self::shared_key(name) {
            Some(key) => (self.registry.attach(key, create)?, Some(self.registry.clone())),
            None if create => (Arc::new(Database::new(name)), None),
            None => return Err(VfsError::cannot_open(name, "private database requires CREATE")),
        };

        tracing::debug!(
            db = name,
            shared = registry.is_some(),
            read_only,
            size = db.size(),
            "opened file"
        );

        let file = MemFile::new(db, registry, read_only, self.config.exclusive_lock_timeout);
        Ok((file, flags | OpenFlags::MEMORY))
    }

    fn delete(&self, _name: &str, _sync_dir: bool) -> Result<()> {
        // Journals never live outside the registry.
        Ok(())
    }

    fn access(&self, _name: &str, _flags: AccessFlags) -> Result<bool> {
        Ok(false)
    }

    fn full_pathname(&self, name: &str) -> Result<String> {
        Ok(name.to_string())
    }
}
