//! Disposable databases for test isolation

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;

use super::Registry;

/// Next suffix for generated names
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// An empty shared database under a unique name
///
/// The name is removed from its registry when the guard drops. Handles that
/// are still open keep working on their own copy of the reference.
#[derive(Debug)]
pub struct TestDb {
    name: String,
    registry: Registry,
}

impl TestDb {
    /// Allocate in the global registry
    pub fn new() -> Self {
        Self::in_registry(Registry::global())
    }

    /// Allocate in `registry`
    pub fn in_registry(registry: &Registry) -> Self {
        let thread = std::thread::current();
        let prefix = thread.name().unwrap_or("test").replace("::", "_");
        let name = format!("{}_{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed));

        registry.create(&name, Vec::new());
        Self {
            name,
            registry: registry.clone(),
        }
    }

    /// Registry key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name to pass to `open` to reach the shared database
    pub fn open_name(&self) -> String {
        format!("/{}", self.name)
    }

    /// URI that opens the database through the VFS named in `config`
    ///
    /// `params` are appended after `vfs` in order, unescaped.
    pub fn open_uri(&self, config: &Config, params: &[(&str, &str)]) -> String {
        let mut uri = format!("file:{}?vfs={}", self.open_name(), config.vfs_name);
        for (key, value) in params {
            uri.push('&');
            uri.push_str(key);
            uri.push('=');
            uri.push_str(value);
        }
        uri
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        self.registry.delete(&self.name);
    }
}
