//! Completion-server transport.
//!
//! Both model endpoints speak the same completion protocol: POST a
//! sampling request, receive `{"content": "<raw text>"}`. The transport
//! trait keeps the HTTP layer pluggable; tests substitute a stub.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GuardModelError, Result};

/// Request timeout for both endpoints. A timeout is handled exactly like
/// any other transport failure: the caller fails closed, no retry.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// A completion request as the inference server expects it.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub n_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
    pub stop: Vec<String>,
}

/// The completion server's response body.
#[derive(Clone, Debug, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
}

/// Transport to a completion endpoint.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// HTTP transport backed by reqwest.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport for the given completion endpoint URL. The
    /// timeout is carried by the client itself.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GuardModelError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| GuardModelError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardModelError::Unavailable(format!(
                "endpoint returned {status}"
            )));
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| GuardModelError::Protocol(format!("response body: {e}")))
    }
}
