// Copyright 2025 Fedboard Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fedboard Client
//!
//! Async client for the fedboard metrics API.

use crate::types::*;
use fedboard_core::{
    AggregateStats, AveragedLatestRound, BestRound, NewTrainingRound, PerformanceSample,
    TrainingRound,
};
use reqwest::{Client as HttpClient, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Fedboard SDK errors.
///
/// `Unavailable` means the server (or its store) failed and the call may be
/// retried; `NotFound` means the requested thing does not exist yet.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("server unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether the same call might succeed later
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Unavailable { .. } => true,
            ClientError::Request(e) => e.is_timeout() || e.is_connect(),
            ClientError::Api { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS.as_u16(),
            _ => false,
        }
    }
}

/// Result type for fedboard client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Fedboard client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the fedboard server
    pub url: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
    /// Session token sent as a bearer token on every request
    pub session_token: Option<String>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            session_token: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate requests with a session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

/// Map a failed response onto [`ClientError`].
///
/// `body` is the raw response text; the server's `{message}` is used when it
/// parses, the raw text otherwise.
pub fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::NOT_FOUND {
        ClientError::NotFound(message)
    } else if status.is_server_error() {
        ClientError::Unavailable {
            status: status.as_u16(),
            message,
        }
    } else {
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Fedboard client.
///
/// # Example
///
/// ```no_run
/// use fedboard_client::{ClientConfig, MetricsClient, RoundsQuery};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MetricsClient::new(ClientConfig::new("http://localhost:8000"))?;
///
///     for client_id in client.list_clients().await? {
///         let rounds = client.rounds_for_client(&client_id, &RoundsQuery::default()).await?;
///         println!("{}: {} rounds", client_id, rounds.len());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MetricsClient {
    base: Url,
    session_token: Option<String>,
    http_client: HttpClient,
}

impl MetricsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut base =
            Url::parse(&config.url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.url));
        }
        // Segments are appended onto the base path
        if let Ok(mut segments) = base.path_segments_mut() {
            segments.pop_if_empty();
        }

        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            base,
            session_token: config.session_token,
            http_client,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http_client.request(method, self.url(segments)?);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Make a request and decode a successful response.
    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let response = self.send(method, segments, params, body).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.request(Method::GET, segments, &[], None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, segments, &[], Some(body)).await
    }

    /// Liveness check.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get(&["health"]).await
    }

    /// Liveness plus store reachability.
    ///
    /// A degraded server answers 503 with the same body, which is returned as
    /// a report rather than an error.
    pub async fn health_detailed(&self) -> Result<DetailedHealth> {
        let response = self
            .send(Method::GET, &["health", "detailed"], &[], None::<&()>)
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(report) = serde_json::from_str(&text) {
                return Ok(report);
            }
        }
        Err(error_for_status(status, &text))
    }

    /// Every client id that appears in at least one round.
    pub async fn list_clients(&self) -> Result<Vec<String>> {
        self.get(&["clients"]).await
    }

    /// Every round, newest first.
    pub async fn all_rounds(&self) -> Result<Vec<TrainingRound>> {
        self.get(&["rounds"]).await
    }

    /// Rounds that include `client_id`.
    pub async fn rounds_for_client(
        &self,
        client_id: &str,
        query: &RoundsQuery,
    ) -> Result<Vec<TrainingRound>> {
        self.request(Method::GET, &["rounds", client_id], &query.params(), None::<&()>)
            .await
    }

    pub async fn round(&self, round_id: &str) -> Result<TrainingRound> {
        self.get(&["round", round_id]).await
    }

    /// The latest round of each client, deduplicated, newest first.
    pub async fn latest_rounds(&self) -> Result<Vec<TrainingRound>> {
        self.get(&["latest-rounds"]).await
    }

    pub async fn averaged_latest_round(&self) -> Result<AveragedLatestRound> {
        self.get(&["latest-rounds", "averaged"]).await
    }

    /// Best single client result by F1, or `None` with no rounds.
    pub async fn best_f1_global(&self) -> Result<Option<BestRound>> {
        self.get(&["best-f1-global"]).await
    }

    /// Historical averages, or `None` with no rounds.
    pub async fn stats(&self) -> Result<Option<AggregateStats>> {
        self.get(&["stats"]).await
    }

    /// Check the configured session token.
    pub async fn verify_token(&self) -> Result<SessionInfo> {
        self.get(&["auth", "verify-token"]).await
    }

    /// Test whether a store URI is usable by the server.
    pub async fn test_connection(&self, uri: &str) -> Result<AdminAck> {
        self.post(&["database", "test"], &json!({ "uri": uri })).await
    }

    /// Empty every round and every performance sample.
    pub async fn clear_database(&self) -> Result<ClearSummary> {
        self.post(&["database", "clear"], &json!({})).await
    }

    /// Record a round; the server stamps `created_at`.
    pub async fn insert_round(&self, round: &NewTrainingRound) -> Result<TrainingRound> {
        self.post(&["database", "rounds"], round).await
    }

    pub async fn insert_sample(&self, sample: &PerformanceSample) -> Result<AdminAck> {
        self.post(&["database", "samples"], sample).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let err = error_for_status(StatusCode::NOT_FOUND, r#"{"message":"Round not found: r9"}"#);
        assert!(matches!(&err, ClientError::NotFound(m) if m == "Round not found: r9"));
        assert!(!err.is_retryable());

        let err = error_for_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Internal server error"}"#,
        );
        assert!(matches!(err, ClientError::Unavailable { status: 500, .. }));
        assert!(err.is_retryable());

        let err = error_for_status(StatusCode::BAD_REQUEST, "plain text");
        assert!(matches!(&err, ClientError::Api { status: 400, message } if message == "plain text"));
        assert!(!err.is_retryable());

        assert!(error_for_status(StatusCode::TOO_MANY_REQUESTS, "{}").is_retryable());
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let client = MetricsClient::new(ClientConfig::new("http://localhost:8000/api/")).unwrap();
        let url = client.url(&["rounds", "clinic a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/rounds/clinic%20a%2Fb");

        let client = MetricsClient::new(ClientConfig::new("http://localhost:8000")).unwrap();
        assert_eq!(
            client.url(&["latest-rounds", "averaged"]).unwrap().as_str(),
            "http://localhost:8000/latest-rounds/averaged"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            MetricsClient::new(ClientConfig::new("not a url")),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            MetricsClient::new(ClientConfig::new("mailto:ops@example.com")),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
