use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// max-age of the collection page, in seconds.
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Shared secret expected by the revalidation endpoint.
    pub revalidate_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            content_cache_age_sec: 3600,
            frontend_dir_path: None,
            revalidate_token: String::new(),
        }
    }
}
