use dagfs_store::StoreError;
use dagfs_types::ObjectId;

/// Errors from tree construction and resolution.
///
/// "Not found" — an absent hash or an unmatched path segment — is not an
/// error. It is a valid query outcome and surfaces as `Ok(None)` from the
/// resolver.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Stored bytes are not a valid object encoding.
    #[error("corrupt object {id}: {reason}")]
    Decode { id: ObjectId, reason: String },

    /// Fetched bytes do not hash back to their content address.
    #[error("hash mismatch for {id}: stored bytes hash to {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// An object could not be canonically encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TreeError {
    pub(crate) fn decode(id: ObjectId, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            id,
            reason: reason.to_string(),
        }
    }
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
