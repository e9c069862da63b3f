use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use super::collection_page::PageCache;
use super::ServerConfig;
use crate::sync::AlbumService;

pub type GuardedAlbumService = Arc<AlbumService>;
pub type GuardedPageCache = Arc<PageCache>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub album_service: GuardedAlbumService,
    pub page_cache: GuardedPageCache,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        album_service: GuardedAlbumService,
        page_cache: GuardedPageCache,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            album_service,
            page_cache,
        }
    }
}

impl FromRef<ServerState> for GuardedAlbumService {
    fn from_ref(input: &ServerState) -> Self {
        input.album_service.clone()
    }
}

impl FromRef<ServerState> for GuardedPageCache {
    fn from_ref(input: &ServerState) -> Self {
        input.page_cache.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
