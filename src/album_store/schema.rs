//! Schema definition for the album document table.

/// One step of the album store schema.
pub struct AlbumStoreSchema {
    pub version: usize,
    pub up: &'static str,
}

/// Name of the table holding the merged album documents.
pub const COLLECTION_ALBUMS: &str = "albums";

/// Applied in order; `PRAGMA user_version` tracks the last applied version.
pub const ALBUM_STORE_VERSIONED_SCHEMAS: &[AlbumStoreSchema] = &[AlbumStoreSchema {
    version: 1,
    up: r#"
            CREATE TABLE IF NOT EXISTS albums (
                id INTEGER PRIMARY KEY,
                document TEXT NOT NULL,
                inserted_at INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int))
            );
        "#,
}];
