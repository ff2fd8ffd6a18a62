//! HTTP transport for flow runs.
//!
//! A single POST per call with a hard timeout. Non-2xx statuses are not errors
//! here: the body may hold a structured upstream error that the normalizer
//! interprets, so status and body are passed through as-is.

pub mod http;

pub use http::HttpTransport;

use crate::protocol::FlowRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Status and parsed JSON body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// Sends a composed [`FlowRequest`]. Implemented by [`HttpTransport`]; tests
/// and embedders may supply their own.
#[async_trait]
pub trait FlowTransport: Send + Sync {
    async fn send(
        &self,
        request: &FlowRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("response (HTTP {status}) was not JSON: {body}")]
    NonJson { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Text suitable for a chat bubble; details stay in `Display`.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransportError::Connect { .. } => {
                "Unable to connect to the server. Please check your internet connection."
            }
            TransportError::Timeout { .. } => {
                "The request timed out. Please try again."
            }
            TransportError::NonJson { .. } => {
                "The server returned an unexpected response. Please try again later."
            }
            TransportError::Http(_) | TransportError::Other(_) => {
                "A network error occurred. Please try again."
            }
        }
    }
}
