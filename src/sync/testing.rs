//! In-memory collaborators for the sync tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::album_store::{AlbumStore, StoreError};
use crate::discogs::models::{BasicInformation, RawArtist, RawFormat, RawLabel};
use crate::discogs::{CatalogClient, CatalogClientError, EnrichedRelease, RawMasterData, RawRelease};

pub fn release(id: u64, master_url: Option<&str>) -> RawRelease {
    RawRelease {
        id,
        instance_id: Some(id * 10),
        date_added: None,
        rating: None,
        folder_id: Some(1),
        basic_information: BasicInformation {
            id,
            master_url: master_url.map(str::to_string),
            title: format!("Album {id}"),
            year: 1990,
            artists: vec![RawArtist {
                name: format!("Artist {id}"),
                ..Default::default()
            }],
            formats: vec![RawFormat {
                name: "Vinyl".to_string(),
                qty: "1".to_string(),
                ..Default::default()
            }],
            labels: vec![RawLabel {
                name: "Label".to_string(),
                catno: format!("CAT {id}"),
                ..Default::default()
            }],
            ..Default::default()
        },
    }
}

pub fn cached(id: u64) -> EnrichedRelease {
    EnrichedRelease::new(release(id, None), None)
}

pub fn master(year: i32) -> RawMasterData {
    RawMasterData {
        year,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    collection: Mutex<Vec<RawRelease>>,
    fail_collection: Mutex<bool>,
    collection_delay: Mutex<Option<Duration>>,
    masters: Mutex<HashMap<String, RawMasterData>>,
    call_counts: Mutex<HashMap<String, usize>>,
    completed: Mutex<HashMap<String, usize>>,
    requested_masters: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new(collection: Vec<RawRelease>) -> Self {
        Self {
            collection: Mutex::new(collection),
            ..Default::default()
        }
    }

    pub fn set_collection(&self, collection: Vec<RawRelease>) {
        *self.collection.lock().unwrap() = collection;
    }

    pub fn fail_collection(&self) {
        *self.fail_collection.lock().unwrap() = true;
    }

    /// Hold every collection fetch for `delay` before answering.
    pub fn delay_collection(&self, delay: Duration) {
        *self.collection_delay.lock().unwrap() = Some(delay);
    }

    /// Calls to `method` that ran to the end.
    pub fn completed(&self, method: &str) -> usize {
        *self.completed.lock().unwrap().get(method).unwrap_or(&0)
    }

    /// Master data served for `url`. Unknown urls answer 404.
    pub fn add_master(&self, url: &str, master_data: RawMasterData) {
        self.masters
            .lock()
            .unwrap()
            .insert(url.to_string(), master_data);
    }

    pub fn call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    pub fn requested_masters(&self) -> Vec<String> {
        self.requested_masters.lock().unwrap().clone()
    }

    fn increment_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_collection(&self) -> Result<Vec<RawRelease>, CatalogClientError> {
        self.increment_call("fetch_collection");
        let delay = *self.collection_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self
            .completed
            .lock()
            .unwrap()
            .entry("fetch_collection".to_string())
            .or_insert(0) += 1;
        if *self.fail_collection.lock().unwrap() {
            return Err(CatalogClientError::HttpError {
                url: "collection".to_string(),
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self.collection.lock().unwrap().clone())
    }

    async fn fetch_master_data(
        &self,
        master_url: &str,
    ) -> Result<RawMasterData, CatalogClientError> {
        self.increment_call("fetch_master_data");
        self.requested_masters
            .lock()
            .unwrap()
            .push(master_url.to_string());
        self.masters
            .lock()
            .unwrap()
            .get(master_url)
            .cloned()
            .ok_or_else(|| CatalogClientError::HttpError {
                url: master_url.to_string(),
                status: 404,
                body: "not found".to_string(),
            })
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<EnrichedRelease>>,
    fail_find: Mutex<bool>,
    fail_insert: Mutex<bool>,
    delete_delay: Mutex<Option<Duration>>,
    call_counts: Mutex<HashMap<String, usize>>,
    inserted_batches: Mutex<Vec<Vec<u64>>>,
    deleted_batches: Mutex<Vec<Vec<u64>>>,
}

impl FakeStore {
    pub fn new(records: Vec<EnrichedRelease>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn fail_find(&self) {
        *self.fail_find.lock().unwrap() = true;
    }

    pub fn fail_insert(&self) {
        *self.fail_insert.lock().unwrap() = true;
    }

    /// Hold every delete for `delay` before applying it.
    pub fn delay_delete(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    pub fn ids(&self) -> Vec<u64> {
        self.records.lock().unwrap().iter().map(|r| r.id()).collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    pub fn inserted_batches(&self) -> Vec<Vec<u64>> {
        self.inserted_batches.lock().unwrap().clone()
    }

    pub fn deleted_batches(&self) -> Vec<Vec<u64>> {
        self.deleted_batches.lock().unwrap().clone()
    }

    fn increment_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

#[async_trait]
impl AlbumStore for FakeStore {
    async fn find_all(&self) -> Result<Vec<EnrichedRelease>, StoreError> {
        self.increment_call("find_all");
        if *self.fail_find.lock().unwrap() {
            return Err(StoreError::Poisoned);
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn insert_many(&self, records: &[EnrichedRelease]) -> Result<usize, StoreError> {
        self.increment_call("insert_many");
        self.inserted_batches
            .lock()
            .unwrap()
            .push(records.iter().map(|r| r.id()).collect());
        if *self.fail_insert.lock().unwrap() {
            return Err(StoreError::Poisoned);
        }
        self.records
            .lock()
            .unwrap()
            .extend(records.iter().cloned());
        Ok(records.len())
    }

    async fn delete_by_ids(&self, ids: &[u64]) -> Result<usize, StoreError> {
        self.increment_call("delete_by_ids");
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.deleted_batches.lock().unwrap().push(ids.to_vec());
        let ids: HashSet<u64> = ids.iter().copied().collect();
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id()));
        Ok(before - records.len())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.increment_call("count");
        Ok(self.records.lock().unwrap().len())
    }
}
