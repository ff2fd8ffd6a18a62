//! 响应归一化：区分成功载荷与上游错误信封，并提取回答文本。
//!
//! Response normalization.
//!
//! Success and error bodies share no discriminator other than a top-level
//! `detail` field, and `detail` itself may be an object, a JSON-encoded string,
//! or plain text. Every step here degrades to an [`AppError`]; nothing panics
//! and nothing returns an empty answer silently.

use crate::error::{AppError, PARSE_FAILURE_MESSAGE, UNKNOWN_UPSTREAM_MESSAGE};
use crate::error_code::UpstreamErrorClass;
use crate::transport::RawResponse;
use crate::types::Answer;
use crate::utils::json_path::{JsonPath, Segment};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

/// Where the answer text lives in a successful run response.
pub const RESULT_PATH: &str = "outputs[0].outputs[0].results.message.text";

fn result_path() -> &'static JsonPath {
    static PATH: OnceLock<JsonPath> = OnceLock::new();
    PATH.get_or_init(|| {
        JsonPath::new(vec![
            Segment::Key("outputs".into()),
            Segment::Index(0),
            Segment::Key("outputs".into()),
            Segment::Index(0),
            Segment::Key("results".into()),
            Segment::Key("message".into()),
            Segment::Key("text".into()),
        ])
    })
}

/// Turn a raw response into an [`Answer`] or a user-presentable [`AppError`].
///
/// `elapsed_ms` is measured by the caller around the transport call.
pub fn normalize(response: RawResponse, elapsed_ms: u64) -> Result<Answer, AppError> {
    let RawResponse { status, body } = response;

    if let Some(detail) = body.get("detail") {
        let err = upstream_error(detail);
        warn!(
            http_status = status,
            error_kind = err.kind.as_str(),
            "flow returned an error envelope"
        );
        return Err(err.with_raw(body));
    }

    match result_path().resolve_str(&body) {
        Ok(text) => Ok(Answer {
            text: text.to_string(),
            raw: body,
            elapsed_ms,
        }),
        Err(e) => {
            warn!(http_status = status, error = %e, "flow response has an unexpected shape");
            Err(AppError::parse(format!("Unexpected response format: {e}")).with_raw(body))
        }
    }
}

/// Map a `detail` value to an upstream error, or a parse error when its
/// structure cannot be read.
pub fn upstream_error(detail: &Value) -> AppError {
    match detail_message(detail) {
        Some(message) => match UpstreamErrorClass::classify(&message) {
            Some(class) => AppError::upstream(class.friendly_message()),
            None if message.is_empty() => AppError::upstream(UNKNOWN_UPSTREAM_MESSAGE),
            None => AppError::upstream(message),
        },
        None => AppError::parse(PARSE_FAILURE_MESSAGE),
    }
}

/// Extract `message` from a detail value. `None` means malformed.
fn detail_message(detail: &Value) -> Option<String> {
    let decoded;
    let structure = match detail {
        Value::Object(_) => detail,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => {
                decoded = v;
                &decoded
            }
            // Plain text detail: it is the message.
            Err(_) => return Some(s.clone()),
        },
        _ => return None,
    };

    match structure.as_object()?.get("message") {
        None => Some(String::new()),
        Some(Value::String(m)) => Some(m.clone()),
        Some(_) => None,
    }
}
