//! HTTP client for the dashboard backend API

use casedash_core::{CaseRecord, DashboardCounts, Error, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Path of the aggregate counts endpoint
pub const COUNTS_PATH: &str = "/api/dashboard/counts";

/// Path of the case list endpoint
pub const CASES_PATH: &str = "/api/dashboard/cases";

/// API client for the dashboard backend
///
/// Requests use the transport's defaults; no timeout is configured here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client that shares an existing connection pool
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an absolute URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base URL '{base_url}' cannot be used as a base"
            )));
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch parsed and saved counts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a counts object.
    pub async fn get_counts(&self) -> Result<DashboardCounts> {
        self.get_json(COUNTS_PATH).await
    }

    /// Fetch the case list
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not an array of cases.
    pub async fn get_cases(&self) -> Result<Vec<CaseRecord>> {
        self.get_json(CASES_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("reading {url} failed: {e}")))?;

        serde_json::from_slice(&body).map_err(|e| Error::MalformedPayload {
            url,
            message: e.to_string(),
        })
    }
}
