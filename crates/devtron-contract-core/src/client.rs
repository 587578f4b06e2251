// crates/devtron-contract-core/src/client.rs
// ============================================================================
// Module: API Client
// Description: HTTP client for the system under test.
// Purpose: Issue one request per step and decode the response body.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`ApiClient`] sends a [`ResolvedRequest`] exactly once: no retries, no
//! timeout unless one is configured, redirects are not followed so the
//! observed status is the one the endpoint returned. Response bodies are read
//! under a hard byte limit and decoded as JSON when possible.
//!
//! Security posture: responses are untrusted; bodies are size-limited and
//! bearer tokens never reach transcripts or logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

use crate::config::TargetConfig;
use crate::error::HarnessError;
use crate::error::ScenarioFailure;
use crate::fixture::ResolvedRequest;
use crate::transcript::HttpExchange;
use crate::transcript::Transcript;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size accepted from the system under test.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Zero-length body.
    Empty,
    /// Body parsed as JSON.
    Json(Value),
    /// Body that is not valid JSON.
    Text(String),
}

impl ResponseBody {
    /// Decodes raw bytes.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        serde_json::from_slice(bytes).map_or_else(
            |_| Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            Self::Json,
        )
    }

    /// Returns the JSON value, if the body was JSON.
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Empty | Self::Text(_) => None,
        }
    }

    /// Transcript rendering: JSON as-is, text as a string, empty as `None`.
    fn to_transcript(&self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Json(value) => Some(value.clone()),
            Self::Text(text) => Some(Value::String(text.clone())),
        }
    }
}

/// Status and decoded body of one response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub body: ResponseBody,
}

/// HTTP client bound to the system under test.
///
/// # Invariants
/// - `base_url` has an http or https scheme.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Reqwest client instance; cheap to clone.
    client: Client,
    /// Base URL request paths are joined to.
    base_url: Url,
}

impl ApiClient {
    /// Builds a client for the configured target.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the HTTP client cannot be constructed.
    pub fn new(target: &TargetConfig) -> Result<Self, HarnessError> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = target.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| HarnessError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base_url: target.base_url.clone(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Fixture`] when the path cannot be joined.
    pub fn url_for(&self, path: &str) -> Result<Url, ScenarioFailure> {
        self.base_url
            .join(path)
            .map_err(|err| ScenarioFailure::Fixture(format!("invalid request path {path}: {err}")))
    }

    /// Sends a request once and records the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Transport`] when no complete response arrives.
    pub async fn execute(
        &self,
        request: &ResolvedRequest,
        transcript: &mut Transcript,
    ) -> Result<ApiResponse, ScenarioFailure> {
        let url = self.url_for(&request.path)?;
        let mut exchange = HttpExchange {
            sequence: 0,
            method: request.method.as_str().to_string(),
            url: url.to_string(),
            request_body: request.body.clone(),
            status: None,
            response_body: None,
            error: None,
        };
        match self.send(url, request).await {
            Ok(response) => {
                exchange.status = Some(response.status);
                exchange.response_body = response.body.to_transcript();
                transcript.record_http(exchange);
                Ok(response)
            }
            Err(failure) => {
                exchange.error = Some(failure.to_string());
                transcript.record_http(exchange);
                Err(failure)
            }
        }
    }

    /// Sends the request and reads the bounded body.
    async fn send(&self, url: Url, request: &ResolvedRequest) -> Result<ApiResponse, ScenarioFailure> {
        let mut builder =
            self.client.request(request.method.to_reqwest(), url).headers(headers(request)?);
        if let Some(body) = &request.body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| ScenarioFailure::Fixture(format!("body serialization failed: {err}")))?;
            builder = builder.body(payload);
        }
        let response =
            builder.send().await.map_err(|err| ScenarioFailure::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let bytes = read_response_body_with_limit(response, MAX_RESPONSE_BYTES).await?;
        Ok(ApiResponse {
            status,
            body: ResponseBody::decode(&bytes),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds request headers: bearer authorization and JSON content type.
fn headers(request: &ResolvedRequest) -> Result<HeaderMap, ScenarioFailure> {
    let mut headers = HeaderMap::new();
    if request.body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Some(token) = &request.bearer {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            ScenarioFailure::Fixture("bearer token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ScenarioFailure> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| ScenarioFailure::Transport(err.to_string()))?
    {
        let next_total = body.len().saturating_add(chunk.len());
        if next_total > limit {
            return Err(ScenarioFailure::Transport(format!(
                "response body exceeds {limit} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
