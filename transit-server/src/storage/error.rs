//! Storage error types.

/// Errors from a record store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The collection held something other than a list of records
    #[error("unexpected shape in {collection}: {reason}")]
    Shape {
        collection: &'static str,
        reason: &'static str,
    },

    /// The store refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
