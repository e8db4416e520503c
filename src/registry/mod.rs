//! Registry Module
//!
//! Process-wide table of shared databases, keyed by name.
//!
//! ## Responsibilities
//! - Create, fork and delete named databases
//! - Resolve names for `open`, creating on demand
//! - Drop a name once its last handle closes, unless the slot was reused
//!
//! The registry is a lookup table, not the sole owner: handles hold their
//! database through an `Arc`, so deleting or replacing a name never
//! invalidates an open handle.

mod test_db;

pub use test_db::TestDb;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{Result, VfsError};
use crate::storage::{force_rollback_journal, Database};

/// Name → database table
///
/// Cloning yields another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    databases: Arc<Mutex<HashMap<String, Arc<Database>>>>,
}

impl Registry {
    /// Create an empty, independent registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, empty at first use
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Create a shared database from `contents`, replacing any entry under `name`
    ///
    /// A WAL header marker in `contents` is rewritten to rollback-journal mode.
    /// The registry keeps one reference, so the database outlives its handles
    /// until `delete` is called.
    pub fn create(&self, name: &str, mut contents: Vec<u8>) -> Arc<Database> {
        if force_rollback_journal(&mut contents) {
            tracing::debug!(db = name, "converted WAL header to rollback journal");
        }

        let db = Arc::new(Database::with_contents(name, &contents));
        db.acquire_ref();

        let replaced = self
            .databases
            .lock()
            .insert(name.to_string(), Arc::clone(&db));

        tracing::debug!(
            db = name,
            size = contents.len(),
            replaced = replaced.is_some(),
            "created database"
        );
        db
    }

    /// Fork `src` into `dst` without copying blocks
    ///
    /// Any entry under `dst` is replaced.
    pub fn fork(&self, src: &str, dst: &str) -> Result<Arc<Database>> {
        let mut databases = self.databases.lock();

        let source = databases
            .get(src)
            .ok_or_else(|| VfsError::cannot_open(src, "no such database to fork"))?;
        let forked = Arc::new(source.fork(dst));
        databases.insert(dst.to_string(), Arc::clone(&forked));
        drop(databases);

        tracing::debug!(src, dst, size = forked.size(), "forked database");
        Ok(forked)
    }

    /// Remove `name`; open handles keep their database
    ///
    /// Returns true if an entry was removed.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.databases.lock().remove(name).is_some();
        tracing::debug!(db = name, removed, "deleted database");
        removed
    }

    /// Look up a database without taking a reference
    pub fn get(&self, name: &str) -> Option<Arc<Database>> {
        self.databases.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.lock().contains_key(name)
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.databases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.lock().is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.lock().keys().cloned().collect();
        names.sort();
        names
    }

    // =========================================================================
    // Handle Lifecycle
    // =========================================================================

    /// Resolve `name` for a new handle and take a reference
    ///
    /// Fails with `CannotOpen` if the name is unknown and `create` is false.
    pub(crate) fn attach(&self, name: &str, create: bool) -> Result<Arc<Database>> {
        let mut databases = self.databases.lock();

        let db = match databases.get(name) {
            Some(db) => Arc::clone(db),
            None if create => {
                let db = Arc::new(Database::new(name));
                databases.insert(name.to_string(), Arc::clone(&db));
                tracing::debug!(db = name, "created database on open");
                db
            }
            None => return Err(VfsError::cannot_open(name, "no such shared database")),
        };

        db.acquire_ref();
        Ok(db)
    }

    /// Drop a handle's reference to `db`
    ///
    /// The name is removed only when no references remain and it still maps
    /// to this exact database; a slot reused by `create` or `fork` is kept.
    pub(crate) fn release(&self, db: &Arc<Database>) {
        let mut databases = self.databases.lock();

        if db.release_ref() > 0 {
            return;
        }
        let still_mapped = databases
            .get(db.name())
            .is_some_and(|current| Arc::ptr_eq(current, db));
        if still_mapped {
            databases.remove(db.name());
            tracing::debug!(db = db.name(), "last handle closed, database dropped");
        }
    }
}

// =============================================================================
// Process-wide Administration
// =============================================================================

/// Create a shared database in the global registry
///
/// Ownership of `contents` moves into the database.
pub fn create(name: &str, contents: Vec<u8>) -> Arc<Database> {
    Registry::global().create(name, contents)
}

/// Fork a shared database in the global registry
pub fn fork(src: &str, dst: &str) -> Result<Arc<Database>> {
    Registry::global().fork(src, dst)
}

/// Delete a shared database from the global registry
pub fn delete(name: &str) -> bool {
    Registry::global().delete(name)
}
