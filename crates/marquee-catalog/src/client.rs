//! HTTP catalog client

use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{CatalogClient, CatalogError, CatalogPage, SearchRequest};
use tracing::debug;
use url::Url;

use crate::dto::SearchEnvelope;

/// Configuration for the HTTP catalog client
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: Url,

    /// API key sent with every request
    pub api_key: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kinopoisk.dev/v1.4/".parse().unwrap(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the remote movie catalog API
pub struct HttpCatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    /// Build a client from the given configuration
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn search_url(&self, request: &SearchRequest, limit: usize) -> Result<Url, CatalogError> {
        let mut url = self
            .config
            .base_url
            .join("movie/search")
            .map_err(|e| CatalogError::Network(format!("invalid catalog URL: {e}")))?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("page", &request.page.to_string());
            params.append_pair("limit", &limit.to_string());
            if !request.query.is_empty() {
                params.append_pair("query", &request.query);
            }
            if let Some(genre) = &request.genre {
                params.append_pair("with_genres", genre);
            }
            if let Some(min) = request.min_rating {
                params.append_pair("rating.kp", &format!("{min}-10"));
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, request: &SearchRequest, limit: usize) -> Result<CatalogPage, CatalogError> {
        let url = self.search_url(request, limit)?;
        debug!(page = request.page, "fetching catalog page");

        let response = self
            .http
            .get(url)
            .header("X-API-KEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(envelope.into_page())
    }
}
