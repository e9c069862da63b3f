//! Two-way reconciliation between the remote collection and the album cache.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::error::SyncError;
use crate::album_store::AlbumStore;
use crate::discogs::{CatalogClient, EnrichedRelease, RawRelease};
use crate::server::metrics::{record_master_data_failure, record_sync_changes, record_sync_run};

/// What a sync run changed in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub deleted: usize,
    /// New releases left out of this run because their master data could
    /// not be fetched.
    pub skipped: usize,
    /// Albums in the returned set.
    pub total: usize,
    pub inserted_ids: Vec<u64>,
    pub deleted_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub albums: Vec<EnrichedRelease>,
    pub report: SyncReport,
}

pub struct Reconciler {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn AlbumStore>,
    master_data_concurrency: usize,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn AlbumStore>,
        master_data_concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            master_data_concurrency: master_data_concurrency.max(1),
        }
    }

    /// Fetch the remote collection, enrich the new releases and bring the
    /// cache in line with the remote.
    ///
    /// The returned albums are the cached ones still present remotely plus
    /// the newly enriched ones. A failed master data fetch only drops that
    /// release from this run; any other failure fails the whole call.
    pub async fn reconcile(&self) -> Result<SyncOutcome, SyncError> {
        let start = Instant::now();
        let result = self.run().await;

        match &result {
            Ok(outcome) => {
                let report = &outcome.report;
                record_sync_run("success", start.elapsed());
                record_sync_changes(report.inserted, report.deleted, report.skipped, report.total);
                info!(
                    "Synced {} albums in {:?}: {} inserted, {} deleted, {} skipped",
                    report.total,
                    start.elapsed(),
                    report.inserted,
                    report.deleted,
                    report.skipped
                );
            }
            Err(err) => {
                record_sync_run("failure", start.elapsed());
                error!("Album sync failed: {}", format_chain(err));
            }
        }

        result
    }

    async fn run(&self) -> Result<SyncOutcome, SyncError> {
        // Both calls settle before either error is reported.
        let (cached, remote) = tokio::join!(
            async { self.store.find_all().await.map_err(SyncError::fetch) },
            async { self.catalog.fetch_collection().await.map_err(SyncError::fetch) },
        );
        let (cached, remote) = (cached?, remote?);
        debug!(
            "Fetched {} cached and {} remote releases",
            cached.len(),
            remote.len()
        );

        let cached_ids: HashSet<u64> = cached.iter().map(EnrichedRelease::id).collect();
        let remote_ids: HashSet<u64> = remote.iter().map(|release| release.id).collect();

        let mut seen = HashSet::new();
        let to_enrich: Vec<RawRelease> = remote
            .into_iter()
            .filter(|release| !cached_ids.contains(&release.id) && seen.insert(release.id))
            .collect();
        let new_count = to_enrich.len();

        let enriched: Vec<EnrichedRelease> = stream::iter(to_enrich)
            .map(|release| self.enrich(release))
            .buffered(self.master_data_concurrency)
            .filter_map(|enriched| async move { enriched })
            .collect()
            .await;

        let to_delete: Vec<u64> = cached
            .iter()
            .map(EnrichedRelease::id)
            .filter(|id| !remote_ids.contains(id))
            .collect();

        // No cancellation: a failed insert still waits for the delete.
        let (inserted, deleted) = tokio::join!(
            async {
                if enriched.is_empty() {
                    return Ok(0);
                }
                self.store
                    .insert_many(&enriched)
                    .await
                    .map_err(SyncError::update)
            },
            async {
                if to_delete.is_empty() {
                    return Ok(0);
                }
                self.store
                    .delete_by_ids(&to_delete)
                    .await
                    .map_err(SyncError::update)
            },
        );
        let (inserted, deleted) = (inserted?, deleted?);

        let inserted_ids: Vec<u64> = enriched.iter().map(EnrichedRelease::id).collect();
        let albums: Vec<EnrichedRelease> = cached
            .into_iter()
            .filter(|album| remote_ids.contains(&album.id()))
            .chain(enriched)
            .collect();

        let report = SyncReport {
            inserted,
            deleted,
            skipped: new_count - inserted_ids.len(),
            total: albums.len(),
            inserted_ids,
            deleted_ids: to_delete,
        };
        Ok(SyncOutcome { albums, report })
    }

    /// Attach master data to a new release. `None` means the fetch failed
    /// and the release sits this run out.
    async fn enrich(&self, release: RawRelease) -> Option<EnrichedRelease> {
        let Some(master_url) = release.master_url().map(str::to_owned) else {
            return Some(EnrichedRelease::new(release, None));
        };

        match self.catalog.fetch_master_data(&master_url).await {
            Ok(master_data) => Some(EnrichedRelease::new(release, Some(master_data))),
            Err(err) => {
                record_master_data_failure(err.kind());
                warn!(
                    "Skipping release {} ({}): {}",
                    release.id,
                    release.basic_information.title,
                    format_chain(&err)
                );
                None
            }
        }
    }
}

fn format_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
