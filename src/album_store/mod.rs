//! Local cache of the merged album documents.

pub mod schema;
mod store;
mod trait_def;

pub use store::SqliteAlbumStore;
pub use trait_def::{AlbumStore, StoreError};

#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockAlbumStore;
