//! Persistent block map
//!
//! Immutable ordered map from block index to block bytes. Every update
//! returns a new root in O(log n); older roots are never disturbed, so
//! forks can hold them indefinitely.

use bytes::Bytes;
use im::OrdMap;

/// Ordered, structurally shared map of blocks
///
/// Cloning is O(1) and shares every node with the original.
#[derive(Debug, Clone, Default)]
pub struct BlockMap {
    blocks: OrdMap<u64, Bytes>,
}

impl BlockMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a block; absence is a normal result
    pub fn get(&self, index: u64) -> Option<&Bytes> {
        self.blocks.get(&index)
    }

    /// Return a new map with `block` installed at `index`
    #[must_use]
    pub fn insert(&self, index: u64, block: Bytes) -> Self {
        Self {
            blocks: self.blocks.update(index, block),
        }
    }

    /// Return a new map without the block at `index`
    #[must_use]
    pub fn remove(&self, index: u64) -> Self {
        Self {
            blocks: self.blocks.without(&index),
        }
    }

    /// Return a new map keeping only blocks with index <= `last`
    #[must_use]
    pub fn retain_through(&self, last: u64) -> Self {
        let mut blocks = self.blocks.clone();
        let beyond: Vec<u64> = match last.checked_add(1) {
            Some(first_dropped) => blocks.range(first_dropped..).map(|(k, _)| *k).collect(),
            None => Vec::new(),
        };
        for index in beyond {
            blocks.remove(&index);
        }
        Self { blocks }
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Highest stored block index
    pub fn last_index(&self) -> Option<u64> {
        self.blocks.get_max().map(|(k, _)| *k)
    }

    /// Iterate blocks in index order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Bytes)> + '_ {
        self.blocks.iter().map(|(k, v)| (*k, v))
    }

    /// True if both maps share the same root
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.blocks.ptr_eq(&other.blocks)
    }
}
