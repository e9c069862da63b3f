use thiserror::Error;

/// Failures of a single request to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// The request never produced a response (connection, timeout, body read).
    #[error("Request to {url} failed")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to \"{url}\" failed with status code \"{status}\" and text \"{body}\"")]
    HttpError {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Could not parse json from {url}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogClientError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogClientError::RequestFailed { .. } => "request_failed",
            CatalogClientError::HttpError { .. } => "http_error",
            CatalogClientError::DecodeError { .. } => "decode_error",
        }
    }
}
