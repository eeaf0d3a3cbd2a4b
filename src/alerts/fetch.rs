//! Broker HTTP access
//!
//! Adapters describe *what* to ask for as a [`FetchRequest`]; an
//! [`AlertFetcher`] performs the call. Tests swap in a canned fetcher.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Default timeout for one broker request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A GET request against a broker endpoint with ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add the parameter only when a value is present.
    pub fn opt_param<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn to_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.url, &self.params)
            .with_context(|| format!("Invalid broker URL {}", self.url))
    }
}

/// Performs broker requests and returns the decoded JSON body.
#[async_trait]
pub trait AlertFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value>;
}

/// `reqwest`-backed fetcher.
pub struct HttpAlertFetcher {
    http: Client,
    api_key: Option<String>,
}

impl HttpAlertFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, api_key: None })
    }

    /// Send `Authorization: Token {key}` with every request.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }
}

#[async_trait]
impl AlertFetcher for HttpAlertFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value> {
        let url = request.to_url()?;
        tracing::debug!(url = %url, "fetching alerts");

        let mut builder = self.http.get(url.clone()).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Token {}", key));
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", request.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "broker API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", request.url))
    }
}
