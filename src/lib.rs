//! Vinyl collection server library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod album;
pub mod album_store;
pub mod config;
pub mod discogs;
pub mod server;
pub mod sync;

// Re-export commonly used types for convenience
pub use album::{AlbumFilter, FormattedAlbum};
pub use album_store::{AlbumStore, SqliteAlbumStore};
pub use discogs::{CatalogClient, DiscogsClient};
pub use server::{run_server, RequestsLoggingLevel};
pub use sync::{AlbumService, SyncError, SyncReport};
