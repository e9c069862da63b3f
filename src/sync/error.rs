use std::fmt;
use thiserror::Error;

use crate::album_store::StoreError;
use crate::discogs::CatalogClientError;

/// Step of the reconciliation at which a fatal failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Reading the cache or fetching the remote collection.
    Fetch,
    /// Writing inserts and deletions to the cache.
    Update,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStage::Fetch => write!(f, "fetching albums"),
            SyncStage::Update => write!(f, "updating the album cache"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncCause {
    #[error(transparent)]
    Catalog(#[from] CatalogClientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Album reconciliation failed while {stage}")]
    ReconciliationFailed {
        stage: SyncStage,
        #[source]
        cause: SyncCause,
    },

    #[error("Could not read albums from the cache")]
    CacheUnavailable(#[source] StoreError),
}

impl SyncError {
    pub fn fetch(cause: impl Into<SyncCause>) -> Self {
        SyncError::ReconciliationFailed {
            stage: SyncStage::Fetch,
            cause: cause.into(),
        }
    }

    pub fn update(cause: impl Into<SyncCause>) -> Self {
        SyncError::ReconciliationFailed {
            stage: SyncStage::Update,
            cause: cause.into(),
        }
    }

    pub fn stage(&self) -> Option<SyncStage> {
        match self {
            SyncError::ReconciliationFailed { stage, .. } => Some(*stage),
            SyncError::CacheUnavailable(_) => None,
        }
    }
}
