//! Collection sync: reconciliation against the remote collection and the
//! entry points built on top of it.

mod error;
mod reconcile;
mod service;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{SyncCause, SyncError, SyncStage};
pub use reconcile::{Reconciler, SyncOutcome, SyncReport};
pub use service::AlbumService;
