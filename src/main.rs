use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vinyl_collection_server::album_store::{AlbumStore, SqliteAlbumStore};
use vinyl_collection_server::config::{
    self, DEFAULT_MASTER_DATA_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SEC,
};
use vinyl_collection_server::discogs::DiscogsClient;
use vinyl_collection_server::server::{
    metrics, run_server, spawn_sync_ticker, PageCache, RequestsLoggingLevel, ServerConfig,
};
use vinyl_collection_server::sync::AlbumService;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the album cache database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Name of the album cache database (without extension).
    #[clap(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of the collection page in the HTTP cache, in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Shared secret of the revalidation endpoint.
    #[clap(long, env = "REVALIDATE_TOKEN", hide_env_values = true)]
    pub revalidate_token: Option<String>,

    /// Authorization header value for the Discogs API.
    #[clap(long, env = "DISCOGS_TOKEN", hide_env_values = true)]
    pub discogs_token: Option<String>,

    /// User-Agent sent to the Discogs API.
    #[clap(long, env = "DISCOGS_USER_AGENT")]
    pub discogs_user_agent: Option<String>,

    /// Collection releases endpoint.
    #[clap(long, env = "DISCOGS_ENDPOINT_RELEASES")]
    pub discogs_collection_url: Option<String>,

    /// Timeout in seconds for Discogs requests.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Maximum number of master data requests in flight during a sync.
    #[clap(long, default_value_t = DEFAULT_MASTER_DATA_CONCURRENCY)]
    pub master_data_concurrency: usize,

    /// Sync the collection once right after startup.
    #[clap(long)]
    pub sync_on_start: bool,

    /// Minutes between background syncs. Set to 0 to disable.
    #[clap(long, default_value_t = 0)]
    pub sync_interval_minutes: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            db_name: args.db_name.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            content_cache_age_sec: args.content_cache_age_sec,
            frontend_dir_path: args.frontend_dir_path.clone(),
            revalidate_token: args.revalidate_token.clone(),
            discogs_token: args.discogs_token.clone(),
            discogs_user_agent: args.discogs_user_agent.clone(),
            discogs_collection_url: args.discogs_collection_url.clone(),
            request_timeout_sec: args.request_timeout_sec,
            master_data_concurrency: args.master_data_concurrency,
            sync_on_start: args.sync_on_start,
            sync_interval_minutes: args.sync_interval_minutes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)
        .context("Invalid configuration")?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  db_name: {}", app_config.db_name);
    info!("  port: {}", app_config.port);
    info!("  collection: {}", app_config.discogs.collection_url);

    let discogs_client =
        DiscogsClient::new(app_config.discogs.clone()).context("Invalid Discogs configuration")?;

    if !app_config.album_db_path().exists() {
        info!(
            "Creating new album database at {:?}",
            app_config.album_db_path()
        );
    }
    let album_store = Arc::new(SqliteAlbumStore::new(&app_config.album_db_path())?);

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::set_cached_albums(album_store.count().await?);

    let album_service = Arc::new(AlbumService::new(
        Arc::new(discogs_client),
        album_store,
        app_config.master_data_concurrency,
    ));
    let page_cache = Arc::new(PageCache::default());

    if app_config.sync_on_start {
        let album_service = album_service.clone();
        let page_cache = page_cache.clone();
        tokio::spawn(async move {
            info!("Running startup sync...");
            if let Err(err) = page_cache.revalidate(&album_service).await {
                error!("Startup sync failed: {:#}", anyhow::Error::new(err));
            }
        });
    }

    if app_config.sync_interval_minutes > 0 {
        spawn_sync_ticker(
            album_service.clone(),
            page_cache.clone(),
            Duration::from_secs(app_config.sync_interval_minutes * 60),
        );
    }

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        content_cache_age_sec: app_config.content_cache_age_sec,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
        revalidate_token: app_config.revalidate_token.clone(),
    };

    run_server(server_config, album_service, page_cache).await
}
