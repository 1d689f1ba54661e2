//! HTTP client for the Portainer API

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::app::options::PortainerOptions;
use crate::errors::{BlazeError, CatalogError};

/// Header carrying the Portainer access token
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for Portainer communication
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client; every request carries the API key
    pub fn new(options: &PortainerOptions) -> Result<Self, BlazeError> {
        let mut api_key = HeaderValue::from_str(options.api_key.expose_secret())
            .map_err(|e| BlazeError::ConfigError(format!("Invalid Portainer token: {}", e)))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(options.insecure)
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET {} failed: {} - {}", url, status, body);
            return Err(CatalogError::UpstreamUnavailable(status.to_string()));
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a PUT request, discarding the response body
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let response = self.client.put(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP PUT {} failed: {} - {}", url, status, body);
            return Err(CatalogError::UpstreamUnavailable(status.to_string()));
        }

        Ok(())
    }
}
