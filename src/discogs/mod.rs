//! Discogs catalog API access.
//!
//! Two endpoints are used: the user's collection listing and the per-release
//! master data referenced from each collection entry.

pub mod client;
mod error;
pub mod models;

pub use client::{CatalogClient, DiscogsClient, DiscogsSettings};
pub use error::CatalogClientError;
pub use models::{EnrichedRelease, RawMasterData, RawRelease};

#[cfg(any(test, feature = "mock"))]
pub use client::MockCatalogClient;
