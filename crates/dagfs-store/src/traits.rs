use dagfs_types::ObjectId;

use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. Content-addressing guarantees this:
///   the same value always lands under the same key.
/// - `put` of an existing key is a no-op. Two writers racing on a key hold
///   identical values, so no locking is required above the backend.
/// - Concurrent reads are always safe (blocks are immutable).
/// - The store never interprets block contents — it is a pure key-value
///   store.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Check whether a block exists in the store.
    fn has(&self, key: &ObjectId) -> StoreResult<bool>;

    /// Read a block by its content-addressed key.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    /// Returns `Err` on I/O failure.
    fn get(&self, key: &ObjectId) -> StoreResult<Option<Vec<u8>>>;

    /// Write a block under its content-addressed key.
    ///
    /// If the key already exists, this is a no-op (idempotent).
    fn put(&self, key: &ObjectId, value: Vec<u8>) -> StoreResult<()>;
}
