use std::sync::Arc;
use tracing::debug;

use super::error::SyncError;
use super::reconcile::{Reconciler, SyncReport};
use crate::album::{format_albums, FormattedAlbum};
use crate::album_store::AlbumStore;
use crate::discogs::CatalogClient;

/// Entry points used by the HTTP layer and the background sync.
///
/// Built once at startup; it owns the only handles to the catalog client
/// and the album store.
pub struct AlbumService {
    reconciler: Reconciler,
    store: Arc<dyn AlbumStore>,
}

impl AlbumService {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn AlbumStore>,
        master_data_concurrency: usize,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(catalog, store.clone(), master_data_concurrency),
            store,
        }
    }

    /// Sync the cache with the remote collection and return the formatted
    /// albums.
    pub async fn get_albums(&self) -> Result<Vec<FormattedAlbum>, SyncError> {
        self.sync().await.map(|(albums, _)| albums)
    }

    /// Like [`AlbumService::get_albums`], also returning what changed.
    pub async fn sync(&self) -> Result<(Vec<FormattedAlbum>, SyncReport), SyncError> {
        let outcome = self.reconciler.reconcile().await?;
        Ok((format_albums(&outcome.albums), outcome.report))
    }

    /// Formatted albums as currently cached. Never calls the remote.
    pub async fn get_albums_from_cache(&self) -> Result<Vec<FormattedAlbum>, SyncError> {
        let cached = self
            .store
            .find_all()
            .await
            .map_err(SyncError::CacheUnavailable)?;
        debug!("Read {} albums from cache", cached.len());
        Ok(format_albums(&cached))
    }
}
