use crate::protocol::FlowRequest;
use crate::transport::{FlowTransport, RawResponse, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Longest body excerpt kept when a response is not JSON.
const BODY_SNIPPET_CHARS: usize = 512;

/// reqwest-backed transport. One instance is meant to be reused across calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flowchat/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            TransportError::Connect {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                message: err.to_string(),
            }
        } else {
            TransportError::Http(err)
        }
    }
}

#[async_trait]
impl FlowTransport for HttpTransport {
    async fn send(
        &self,
        request: &FlowRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let resp = self
            .client
            .post(&request.url)
            .headers(request.headers.clone())
            .json(&request.body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify(e, timeout))?;

        // Status is passed through untouched; error envelopes arrive as 4xx/5xx bodies.
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(|e| Self::classify(e, timeout))?;
        debug!(http_status = status, body_bytes = bytes.len(), "flow response received");

        let body: Value = serde_json::from_slice(&bytes).map_err(|_| TransportError::NonJson {
            status,
            body: String::from_utf8_lossy(&bytes)
                .chars()
                .take(BODY_SNIPPET_CHARS)
                .collect(),
        })?;

        Ok(RawResponse { status, body })
    }
}
