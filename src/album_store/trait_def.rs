//! AlbumStore trait definition.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::discogs::EnrichedRelease;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not open album store at {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Album store {operation} failed")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Malformed album document {id}")]
    Document {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Album store connection lock poisoned")]
    Poisoned,

    #[error("Album store worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

/// Storage for the merged album documents.
///
/// Implementations must tolerate concurrent calls; the sync pipeline issues
/// the read, insert and delete operations from independent tasks.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// All stored documents, in insertion order.
    async fn find_all(&self) -> Result<Vec<EnrichedRelease>, StoreError>;

    /// Insert all given documents. Empty input is a no-op. A duplicate id
    /// fails the whole call and nothing is inserted.
    async fn insert_many(&self, records: &[EnrichedRelease]) -> Result<usize, StoreError>;

    /// Delete every document whose id is in `ids`. Empty input is a no-op.
    /// Returns the number of deleted documents.
    async fn delete_by_ids(&self, ids: &[u64]) -> Result<usize, StoreError>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize, StoreError>;
}
