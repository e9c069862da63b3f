//! HTTP client for the Discogs API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::CatalogClientError;
use super::models::{CollectionPage, RawMasterData, RawRelease};
use crate::config::ConfigError;

/// Operations the sync pipeline needs from the remote catalog.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch every release in the configured user's collection.
    async fn fetch_collection(&self) -> Result<Vec<RawRelease>, CatalogClientError>;

    /// Fetch the master data a release points to.
    async fn fetch_master_data(&self, master_url: &str)
        -> Result<RawMasterData, CatalogClientError>;
}

/// Credentials and endpoint for the collection listing.
#[derive(Debug, Clone)]
pub struct DiscogsSettings {
    /// Value sent verbatim in the `Authorization` header
    /// (e.g. `Discogs token=...`).
    pub token: String,
    pub user_agent: String,
    pub collection_url: String,
    pub timeout_sec: u64,
}

/// reqwest based [`CatalogClient`].
pub struct DiscogsClient {
    client: reqwest::Client,
    collection_url: String,
}

impl DiscogsClient {
    /// Create a new client.
    ///
    /// Every setting is validated here so that a misconfigured deployment
    /// fails before the first request goes out.
    pub fn new(settings: DiscogsSettings) -> Result<Self, ConfigError> {
        let token = require("discogs_token", &settings.token)?;
        let user_agent = require("discogs_user_agent", &settings.user_agent)?;
        let collection_url = require("discogs_collection_url", &settings.collection_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value("discogs_user_agent", user_agent)?);
        let mut authorization = header_value("discogs_token", token)?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_sec))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            collection_url: collection_url.to_string(),
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogClientError> {
        debug!("GET {}", url);
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| CatalogClientError::RequestFailed {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CatalogClientError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(CatalogClientError::HttpError {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| CatalogClientError::DecodeError {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CatalogClient for DiscogsClient {
    async fn fetch_collection(&self) -> Result<Vec<RawRelease>, CatalogClientError> {
        let page: CollectionPage = self.get_json(&self.collection_url).await?;
        debug!("Fetched {} releases from collection", page.releases.len());
        Ok(page.releases)
    }

    async fn fetch_master_data(
        &self,
        master_url: &str,
    ) -> Result<RawMasterData, CatalogClientError> {
        self.get_json(master_url).await
    }
}

fn require<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::Invalid {
        name,
        reason: "not a valid HTTP header value".to_string(),
    })
}
