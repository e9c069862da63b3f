mod collection_page;
pub mod config;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;
mod sync_task;

pub use collection_page::{CollectionSnapshot, LoadStatus, PageCache};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use sync_task::spawn_sync_ticker;
