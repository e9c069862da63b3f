//! Snapshot of the collection page served to the frontend.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::album::FormattedAlbum;
use crate::sync::{AlbumService, SyncError, SyncReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Resolved,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    pub status: LoadStatus,
    pub albums: Vec<FormattedAlbum>,
    pub generated_at: DateTime<Utc>,
}

impl CollectionSnapshot {
    pub fn resolved(albums: Vec<FormattedAlbum>) -> Self {
        Self {
            status: LoadStatus::Resolved,
            albums,
            generated_at: Utc::now(),
        }
    }

    /// Empty page shown when the collection could not be loaded.
    pub fn rejected() -> Self {
        Self {
            status: LoadStatus::Rejected,
            albums: vec![],
            generated_at: Utc::now(),
        }
    }
}

/// Last successfully built collection page.
///
/// Built lazily from the cache and replaced on every successful sync. A
/// failed build is not kept, so the next request tries again.
#[derive(Default)]
pub struct PageCache {
    snapshot: RwLock<Option<Arc<CollectionSnapshot>>>,
}

impl PageCache {
    pub async fn current(&self) -> Option<Arc<CollectionSnapshot>> {
        self.snapshot.read().await.clone()
    }

    pub async fn get_or_build(&self, service: &AlbumService) -> Arc<CollectionSnapshot> {
        if let Some(snapshot) = self.current().await {
            return snapshot;
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref() {
            return snapshot.clone();
        }

        match service.get_albums_from_cache().await {
            Ok(albums) => {
                let snapshot = Arc::new(CollectionSnapshot::resolved(albums));
                *guard = Some(snapshot.clone());
                snapshot
            }
            Err(err) => {
                error!(
                    "Failed to build collection page: {:#}",
                    anyhow::Error::new(err)
                );
                Arc::new(CollectionSnapshot::rejected())
            }
        }
    }

    pub async fn replace(&self, albums: Vec<FormattedAlbum>) {
        let snapshot = Arc::new(CollectionSnapshot::resolved(albums));
        *self.snapshot.write().await = Some(snapshot);
    }

    /// Sync with the remote collection and swap in the resulting page.
    /// On failure the previous page stays in place.
    pub async fn revalidate(&self, service: &AlbumService) -> Result<SyncReport, SyncError> {
        let (albums, report) = service.sync().await?;
        self.replace(albums).await;
        info!("Collection page revalidated with {} albums", report.total);
        Ok(report)
    }
}
