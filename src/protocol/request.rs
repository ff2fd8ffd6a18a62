//! Wire request composition for a single flow run.

use crate::config::ClientConfig;
use crate::types::{IoType, Query, Tweaks};
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Header carrying the organization scope when one is configured.
pub const ORG_ID_HEADER: &str = "x-org-id";

/// Everything the transport needs to perform one POST.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    pub url: String,
    pub body: Value,
    pub headers: HeaderMap,
}

impl FlowRequest {
    /// The `session_id` that ended up in the body, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.body.get("session_id").and_then(Value::as_str)
    }
}

#[derive(Serialize)]
struct RunPayload<'a> {
    input_value: &'a str,
    output_type: IoType,
    input_type: IoType,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Tweaks::is_empty")]
    tweaks: Tweaks,
}

/// Compose URL, JSON body and headers for `query` against `config`.
///
/// Deterministic for identical inputs, except that shapes requiring a session
/// get a fresh UUID whenever the query carries none.
pub fn build(query: &Query, config: &ClientConfig) -> Result<FlowRequest> {
    let shape = config.api_shape();
    let endpoint = query
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| config.endpoint_id());

    let url = compose_url(config.base_url(), &shape.path_segments(config.flow_id(), endpoint))?;

    let session_id = match query.session_id.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => Some(id.to_string()),
        None if shape.requires_session() => Some(Uuid::new_v4().to_string()),
        None => None,
    };

    let payload = RunPayload {
        input_value: query.text(),
        output_type: query.output_type,
        input_type: query.input_type,
        session_id,
        tweaks: query.tweaks.merged_over(config.default_tweaks()),
    };
    let body = serde_json::to_value(&payload)?;
    let headers = build_headers(config)?;

    debug!(
        url = url.as_str(),
        api_shape = shape.as_str(),
        tweak_components = payload.tweaks.len(),
        has_session = payload.session_id.is_some(),
        "composed flow request"
    );

    Ok(FlowRequest { url, body, headers })
}

fn compose_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = url::Url::parse(base).map_err(|e| {
        Error::validation_with_context(
            format!("invalid base url: {e}"),
            ErrorContext::new().with_field_path("base_url"),
        )
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            Error::validation_with_context(
                "base url cannot carry a path",
                ErrorContext::new().with_field_path("base_url"),
            )
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(token) = config.token() {
        headers.insert(AUTHORIZATION, header_value("token", &format!("Bearer {token}"))?);
    }
    if let Some(org) = config.org_id() {
        headers.insert(HeaderName::from_static(ORG_ID_HEADER), header_value("org_id", org)?);
    }
    if !headers.is_empty() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
    Ok(headers)
}

fn header_value(field: &str, raw: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(raw).map_err(|_| {
        Error::validation_with_context(
            "value is not a valid HTTP header",
            ErrorContext::new()
                .with_field_path(field)
                .with_source("request_builder"),
        )
    })?;
    if field == "token" {
        value.set_sensitive(true);
    }
    Ok(value)
}
