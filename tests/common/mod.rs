//! Common test infrastructure
//!
//! End-to-end tests run the real Discogs client against a wiremock server
//! and the real SQLite store in a temporary directory.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vinyl_collection_server::album_store::{AlbumStore, SqliteAlbumStore};
use vinyl_collection_server::discogs::{DiscogsClient, DiscogsSettings, EnrichedRelease};
use vinyl_collection_server::sync::AlbumService;

pub const COLLECTION_PATH: &str = "/users/collector/collection/folders/0/releases";
pub const TOKEN: &str = "Discogs token=test-token";
pub const USER_AGENT: &str = "VinylCollectionTests/1.0";

pub fn release_json(id: u64, artist: &str, title: &str, master_url: Option<&str>) -> Value {
    json!({
        "id": id,
        "instance_id": id * 100,
        "folder_id": 1,
        "basic_information": {
            "id": id,
            "title": title,
            "year": 1990,
            "thumb": format!("https://img.example/{id}-thumb.jpg"),
            "cover_image": format!("https://img.example/{id}.jpg"),
            "master_url": master_url,
            "artists": [{"name": artist}],
            "formats": [{"name": "Vinyl", "qty": "1"}],
            "labels": [{"name": "Label", "catno": format!("CAT-{id}")}],
            "genres": ["Rock"]
        }
    })
}

pub fn master_json(year: i32, tracks: &[&str]) -> Value {
    let tracklist: Vec<Value> = tracks
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({"position": format!("A{}", i + 1), "type_": "track", "title": title, "duration": "3:00"})
        })
        .collect();
    json!({
        "id": 1,
        "year": year,
        "tracklist": tracklist,
        "videos": [{"uri": "https://www.youtube.com/watch?v=x", "title": "Video"}]
    })
}

pub struct TestEnv {
    pub remote: MockServer,
    pub store: Arc<SqliteAlbumStore>,
    pub service: Arc<AlbumService>,
    _db_dir: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        let remote = MockServer::start().await;
        let db_dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteAlbumStore::new(&db_dir.path().join("albums.db")).unwrap());
        let client = DiscogsClient::new(DiscogsSettings {
            token: TOKEN.to_string(),
            user_agent: USER_AGENT.to_string(),
            collection_url: format!("{}{}", remote.uri(), COLLECTION_PATH),
            timeout_sec: 5,
        })
        .unwrap();
        let service = Arc::new(AlbumService::new(Arc::new(client), store.clone(), 4));

        Self {
            remote,
            store,
            service,
            _db_dir: db_dir,
        }
    }

    pub fn master_url(&self, id: u64) -> String {
        format!("{}/masters/{}", self.remote.uri(), id)
    }

    /// Replace whatever collection the remote currently serves.
    pub async fn serve_collection(&self, releases: Vec<Value>) {
        self.remote.reset().await;
        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"page": 1, "pages": 1, "items": releases.len()},
                "releases": releases
            })))
            .mount(&self.remote)
            .await;
    }

    pub async fn serve_master(&self, id: u64, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/masters/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.remote)
            .await;
    }

    pub async fn fail_master(&self, id: u64, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/masters/{id}")))
            .respond_with(ResponseTemplate::new(status).set_body_string("unavailable"))
            .mount(&self.remote)
            .await;
    }

    pub async fn seed(&self, records: Vec<EnrichedRelease>) {
        self.store.insert_many(&records).await.unwrap();
    }

    pub async fn cached_ids(&self) -> Vec<u64> {
        self.store
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(EnrichedRelease::id)
            .collect()
    }

    pub async fn master_requests(&self) -> usize {
        self.remote
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with("/masters/"))
            .count()
    }
}

pub fn cached_release(id: u64, artist: &str, title: &str) -> EnrichedRelease {
    serde_json::from_value(release_json(id, artist, title, None)).unwrap()
}
