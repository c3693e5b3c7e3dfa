//! Hash-keyed block storage for dagfs.
//!
//! The store is a pure key-value collaborator: keys are content addresses,
//! values are either raw leaf chunk bytes or canonical non-leaf object
//! encodings. Which of the two a value is belongs to the tree layer — the
//! store never interprets its contents.
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. Writes are append-only and idempotent: a `put` for an existing key is
//!    a no-op, and any two writers racing on a key agree on its value.
//! 3. Concurrent reads are always safe.
//! 4. All I/O errors are propagated, never silently ignored.
//!
//! There is no delete: garbage collection is out of scope for this layer.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryBlockStore;
pub use traits::BlockStore;
