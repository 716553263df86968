//! Named, reusable outbound HTTP clients.
//!
//! Clients are registered once at startup under a string key and bound to a
//! base URL; consumers clone them out by name. Timeout, retry, and breaker
//! policy stay at client defaults.

pub mod api;

pub use api::{ApiClient, ServiceSummary};

use std::collections::HashMap;

use reqwest::Url;
use thiserror::Error;
use tracing::Instrument;

/// A pre-configured client bound to a base address.
#[derive(Debug, Clone)]
pub struct NamedClient {
    name: String,
    client: reqwest::Client,
    base_url: Url,
}

impl NamedClient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path against the client's base address.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidPath {
                path: path.to_string(),
                reason: err.to_string(),
            })
    }

    /// GET a JSON document relative to the base address, inside a span so
    /// the call shows up in the exported traces.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let span = tracing::info_span!(
            "http.client.request",
            client = %self.name,
            method = "GET",
            url = %url,
        );

        async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| ClientError::Request {
                    url: url.to_string(),
                    reason: err.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response.json().await.map_err(|err| ClientError::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            })
        }
        .instrument(span)
        .await
    }
}

/// Registry of named clients, built during bootstrap and never mutated after.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, NamedClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a client to `base_url` under `name`. A malformed base URL fails
    /// registration immediately.
    pub fn register(&mut self, name: &str, base_url: &str) -> Result<(), ClientError> {
        let base_url = Url::parse(base_url).map_err(|err| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not usable as a base address".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;

        tracing::info!(client = name, base_url = %base_url, "registered http client");

        self.clients.insert(
            name.to_string(),
            NamedClient {
                name: name.to_string(),
                client,
                base_url,
            },
        );

        Ok(())
    }

    /// Clone out a registered client by name.
    pub fn get(&self, name: &str) -> Result<NamedClient, ClientError> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::Unknown(name.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid request path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("failed to build http client: {0}")]
    Build(String),
    #[error("no client registered under `{0}`")]
    Unknown(String),
    #[error("request to `{url}` failed: {reason}")]
    Request { url: String, reason: String },
    #[error("request to `{url}` returned status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from `{url}`: {reason}")]
    Decode { url: String, reason: String },
}
