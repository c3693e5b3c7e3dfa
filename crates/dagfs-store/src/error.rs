use dagfs_types::ObjectId;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Attempted to write a block under the null key.
    #[error("cannot store block with null key")]
    NullKey,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure that is not a plain I/O error.
    #[error("backend error for {id}: {reason}")]
    Backend {
        id: ObjectId,
        reason: String,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
