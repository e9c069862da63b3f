//! Background collection sync.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::PageCache;
use crate::sync::AlbumService;

/// Revalidate the collection page every `every`, starting one period from
/// now. Failed runs are logged and the ticker keeps going.
pub fn spawn_sync_ticker(
    album_service: Arc<AlbumService>,
    page_cache: Arc<PageCache>,
    every: Duration,
) -> JoinHandle<()> {
    info!("Syncing the collection every {:?}", every);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if page_cache.revalidate(&album_service).await.is_err() {
                warn!("Periodic sync failed, next attempt in {:?}", every);
            }
        }
    })
}
