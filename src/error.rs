//! Error vocabulary of the jar store.

use kombucha_core::JarId;

/// Errors surfaced by [`crate::store::JarStore`] and its storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No jar with this id exists.
    #[error("jar {0} not found")]
    NotFound(JarId),

    /// The storage backend could not complete a read or write.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored history blob could not be decoded.
    #[error("malformed history for jar {jar_id}: {source}")]
    MalformedHistory {
        jar_id: JarId,
        #[source]
        source: serde_json::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
