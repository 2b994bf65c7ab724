// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the agent project service.
//!
//! Provides [`FoundryClient`], which handles URL construction, the
//! `api-version` query parameter, bearer authentication and JSON decoding.
//! Adapters map its [`ClientError`] into the routing error they report.

use std::time::Duration;

use groundroute_config::model::DiscoveryConfig;
use groundroute_core::RouterError;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Failure of one call to the project service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request URL for `{path}`: {message}")]
    Url { path: String, message: String },
}

impl ClientError {
    /// HTTP status of the failed call, when the service answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Decode(_) | ClientError::Url { .. } => None,
        }
    }
}

/// Thin JSON client bound to one project endpoint.
#[derive(Debug, Clone)]
pub struct FoundryClient {
    client: reqwest::Client,
    base_url: Url,
    api_version: String,
}

impl FoundryClient {
    /// Creates a client for `endpoint`.
    ///
    /// `api_key`, when present, is sent as a bearer token on every call.
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, RouterError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| RouterError::Config(format!("invalid API key header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RouterError::Internal(format!("failed to build HTTP client: {e}")))?;

        // Trailing slash so `join` appends to the project path.
        let base_url = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))
            .map_err(|e| RouterError::Config(format!("invalid discovery endpoint `{endpoint}`: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_version: api_version.to_string(),
        })
    }

    /// Creates a client from the discovery section, `None` when no endpoint
    /// is configured.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Option<Self>, RouterError> {
        config
            .endpoint
            .as_deref()
            .map(|endpoint| {
                Self::new(
                    endpoint,
                    config.api_key.as_deref(),
                    &config.api_version,
                    Duration::from_secs(config.request_timeout_secs),
                )
            })
            .transpose()
    }

    /// Endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL for `path` with the API version and any extra query
    /// pairs, percent-encoded.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Url {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version)
            .extend_pairs(query);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path, query)?).send().await?;
        decode(path, response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(self.url(path, &[])?).json(body).send().await?;
        decode(path, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let response = self.client.delete(self.url(path, &[])?).send().await?;
        let status = response.status();
        debug!(path, status = %status, "delete response received");
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Status { status, body })
        }
    }
}

async fn decode<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    debug!(path, status = %status, "response received");
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}
