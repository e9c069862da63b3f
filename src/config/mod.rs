mod file_config;

pub use file_config::{DiscogsConfig, FileConfig, SyncConfig};

use crate::discogs::DiscogsSettings;
use crate::server::RequestsLoggingLevel;
use clap::ValueEnum;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MASTER_DATA_CONCURRENCY: usize = 8;

/// Invalid or incomplete configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Database directory does not exist: {0:?}")]
    DbDirNotFound(PathBuf),

    #[error("db_dir is not a directory: {0:?}")]
    DbDirNotADirectory(PathBuf),

    #[error("Could not build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub db_name: Option<String>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub revalidate_token: Option<String>,
    pub discogs_token: Option<String>,
    pub discogs_user_agent: Option<String>,
    pub discogs_collection_url: Option<String>,
    pub request_timeout_sec: u64,
    pub master_data_concurrency: usize,
    pub sync_on_start: bool,
    pub sync_interval_minutes: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub db_name: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Shared secret of the revalidation endpoint.
    pub revalidate_token: String,

    // Remote catalog
    pub discogs: DiscogsSettings,
    pub master_data_concurrency: usize,

    // Sync scheduling
    pub sync_on_start: bool,
    /// 0 disables the periodic sync.
    pub sync_interval_minutes: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    ///
    /// Every required value is checked here, before any store is opened or
    /// request is sent.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file_config.unwrap_or_default();
        let discogs_file = file.discogs.unwrap_or_default();
        let sync_file = file.sync.unwrap_or_default();

        let discogs = DiscogsSettings {
            token: required(
                "discogs_token",
                discogs_file.token.or_else(|| cli.discogs_token.clone()),
            )?,
            user_agent: required(
                "discogs_user_agent",
                discogs_file
                    .user_agent
                    .or_else(|| cli.discogs_user_agent.clone()),
            )?,
            collection_url: required(
                "discogs_collection_url",
                discogs_file
                    .collection_url
                    .or_else(|| cli.discogs_collection_url.clone()),
            )?,
            timeout_sec: discogs_file.timeout_sec.unwrap_or(cli.request_timeout_sec),
        };

        let revalidate_token = required(
            "revalidate_token",
            file.revalidate_token
                .or_else(|| cli.revalidate_token.clone()),
        )?;

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or(ConfigError::Missing("db_dir"))?;

        if !db_dir.exists() {
            return Err(ConfigError::DbDirNotFound(db_dir));
        }
        if !db_dir.is_dir() {
            return Err(ConfigError::DbDirNotADirectory(db_dir));
        }

        let db_name = required("db_name", file.db_name.or_else(|| cli.db_name.clone()))?;
        if db_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                name: "db_name",
                reason: "must be a plain file name".to_string(),
            });
        }

        let master_data_concurrency = discogs_file
            .master_data_concurrency
            .unwrap_or(cli.master_data_concurrency);
        if master_data_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "master_data_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            db_dir,
            db_name,
            port: file.port.unwrap_or(cli.port),
            metrics_port: file.metrics_port.unwrap_or(cli.metrics_port),
            logging_level,
            content_cache_age_sec: file
                .content_cache_age_sec
                .unwrap_or(cli.content_cache_age_sec),
            frontend_dir_path: file
                .frontend_dir_path
                .or_else(|| cli.frontend_dir_path.clone()),
            revalidate_token,
            discogs,
            master_data_concurrency,
            sync_on_start: sync_file.on_start.unwrap_or(cli.sync_on_start),
            sync_interval_minutes: sync_file
                .interval_minutes
                .unwrap_or(cli.sync_interval_minutes),
        })
    }

    pub fn album_db_path(&self) -> PathBuf {
        self.db_dir.join(format!("{}.db", self.db_name))
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
