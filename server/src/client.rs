//! HTTP client for a running daynote server.
//!
//! Used by the `daynote append` subcommand to submit text to the append
//! endpoint of a server started with `serve-api` or `serve-both`.
//!
//! # Example
//!
//! ```no_run
//! use daynote_server::client::AppendClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AppendClient::new("http://127.0.0.1:8765").unwrap();
//!     let response = client.append("remember the milk").await.unwrap();
//!     println!("{:?} {}", response.status, response.path.display());
//! }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::routes::{AppendResponse, HealthResponse};

/// HTTP request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when talking to the server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

/// Error body returned by the server; only the message is of interest.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the append endpoint.
#[derive(Debug, Clone)]
pub struct AppendClient {
    base_url: String,
    client: Client,
}

impl AppendClient {
    /// Creates a client for the server at `base_url` (e.g. `http://127.0.0.1:8765`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `text` to today's note on the server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server answers with
    /// an error status.
    pub async fn append(&self, text: &str) -> Result<AppendResponse, ClientError> {
        let url = format!("{}/append", self.base_url);
        debug!(url = %url, bytes = text.len(), "Submitting text");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
            .body(text.to_owned())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(Self::server_error(status, response).await),
        }
    }

    /// Fetches the server's health report.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the server is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(Self::server_error(status, response).await),
        }
    }

    async fn server_error(status: StatusCode, response: reqwest::Response) -> ClientError {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        ClientError::ServerError {
            status: status.as_u16(),
            message,
        }
    }
}
