use std::collections::HashMap;
use std::sync::RwLock;

use dagfs_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. All blocks are held in memory behind a
/// `RwLock` for safe concurrent access. Values are cloned on read.
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl MemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|value| value.len() as u64)
            .sum()
    }

    /// Remove all blocks from the store.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all block keys in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for MemoryBlockStore {
    fn has(&self, key: &ObjectId) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn get(&self, key: &ObjectId) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &ObjectId, value: Vec<u8>) -> StoreResult<()> {
        if key.is_null() {
            return Err(StoreError::NullKey);
        }
        let mut map = self.blocks.write().expect("lock poisoned");
        // Idempotent: if already present, skip (content-addressing guarantees
        // the same key always maps to the same value).
        map.entry(*key).or_insert(value);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("MemoryBlockStore")
            .field("block_count", &count)
            .finish()
    }
}
