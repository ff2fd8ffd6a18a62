//! Successful result of an `ask`.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Text found at the fixed result path, unaltered.
    pub text: String,
    /// Full response body, kept for diagnostics.
    pub raw: Value,
    /// Wall-clock time of the call as measured by the caller.
    pub elapsed_ms: u64,
}
