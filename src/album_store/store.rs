//! SQLite implementation of the album store.
//!
//! Each album is kept as a JSON document keyed by its Discogs release id, so
//! the merged shape (release plus master data) round-trips unchanged.

use async_trait::async_trait;
use rusqlite::{params, Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::schema::{ALBUM_STORE_VERSIONED_SCHEMAS, COLLECTION_ALBUMS};
use super::trait_def::{AlbumStore, StoreError};
use crate::discogs::EnrichedRelease;
use crate::server::metrics::{record_db_connection_error, record_db_query};

/// Album store backed by a single SQLite connection.
///
/// Constructed once at startup and shared (cheaply cloned) by everything
/// that needs the cache.
#[derive(Clone)]
pub struct SqliteAlbumStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAlbumStore {
    /// Open (or create) the store at `path` and bring its schema up to date.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| {
            record_db_connection_error();
            StoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Opened album store at {:?}", path);
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(query_error("open"))?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StoreError> {
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await?;
        record_db_query(operation, start.elapsed());
        result
    }
}

fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(query_error("migrate"))?;

    for schema in ALBUM_STORE_VERSIONED_SCHEMAS
        .iter()
        .filter(|schema| schema.version as i64 > current)
    {
        let tx = conn.transaction().map_err(query_error("migrate"))?;
        tx.execute_batch(schema.up).map_err(query_error("migrate"))?;
        tx.pragma_update(None, "user_version", schema.version as i64)
            .map_err(query_error("migrate"))?;
        tx.commit().map_err(query_error("migrate"))?;
        info!(
            "Migrated {} store schema to version {}",
            COLLECTION_ALBUMS, schema.version
        );
    }
    Ok(())
}

fn query_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |source| StoreError::Query { operation, source }
}

fn insert_documents(tx: &Transaction, documents: &[(i64, String)]) -> Result<(), StoreError> {
    let mut stmt = tx
        .prepare("INSERT INTO albums (id, document) VALUES (?1, ?2)")
        .map_err(query_error("insert"))?;
    for (id, document) in documents {
        stmt.execute(params![id, document])
            .map_err(query_error("insert"))?;
    }
    Ok(())
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn find_all(&self) -> Result<Vec<EnrichedRelease>, StoreError> {
        self.run("find_all", |conn| {
            let mut stmt = conn
                .prepare("SELECT id, document FROM albums ORDER BY rowid ASC")
                .map_err(query_error("find_all"))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
                .map_err(query_error("find_all"))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_error("find_all"))?;

            rows.into_iter()
                .map(|(id, document)| {
                    serde_json::from_str(&document)
                        .map_err(|source| StoreError::Document { id, source })
                })
                .collect()
        })
        .await
    }

    async fn insert_many(&self, records: &[EnrichedRelease]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let documents = records
            .iter()
            .map(|record| {
                let id = record.id() as i64;
                serde_json::to_string(record)
                    .map(|document| (id, document))
                    .map_err(|source| StoreError::Document { id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.run("insert_many", move |conn| {
            let tx = conn.transaction().map_err(query_error("insert"))?;
            insert_documents(&tx, &documents)?;
            tx.commit().map_err(query_error("insert"))?;
            debug!("Inserted {} album documents", documents.len());
            Ok(documents.len())
        })
        .await
    }

    async fn delete_by_ids(&self, ids: &[u64]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = ids.iter().map(|id| *id as i64).collect();
        self.run("delete_by_ids", move |conn| {
            let tx = conn.transaction().map_err(query_error("delete"))?;
            let mut deleted = 0;
            {
                let mut stmt = tx
                    .prepare("DELETE FROM albums WHERE id = ?1")
                    .map_err(query_error("delete"))?;
                for id in &ids {
                    deleted += stmt.execute(params![id]).map_err(query_error("delete"))?;
                }
            }
            tx.commit().map_err(query_error("delete"))?;
            debug!("Deleted {} album documents", deleted);
            Ok(deleted)
        })
        .await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.run("count", |conn| {
            conn.query_row("SELECT COUNT(*) FROM albums", [], |row| row.get::<_, i64>(0))
                .map(|count| count as usize)
                .map_err(query_error("count"))
        })
        .await
    }
}
