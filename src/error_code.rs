//! 上游错误分类：将远端错误消息中的已知子串映射为面向用户的提示。
//!
//! Upstream error classes.
//!
//! The hosted flow service reports failures as free text buried in a `detail`
//! envelope. This module holds the ordered table of known markers and the
//! friendly message each one maps to.
//!
//! | Class               | Marker                                          |
//! |---------------------|-------------------------------------------------|
//! | `QuotaExhausted`    | `429 Resource has been exhausted`               |
//! | `ModelBuildFailed`  | `Error building Component Google Generative AI` |
//! | `InvalidToken`      | `Invalid token`                                 |
//! | `ConnectionRefused` | `Connection refused`                            |
//!
//! ## Example
//!
//! ```rust
//! use flowchat::error_code::UpstreamErrorClass;
//!
//! let class = UpstreamErrorClass::classify("Error: 429 Resource has been exhausted (e.g. check quota)");
//! assert_eq!(class, Some(UpstreamErrorClass::QuotaExhausted));
//! assert_eq!(
//!     class.unwrap().friendly_message(),
//!     "API quota has been exceeded. Please try again later."
//! );
//! ```

use std::fmt;

/// A known upstream failure, recognised by a substring of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorClass {
    /// The model provider behind the flow ran out of quota.
    QuotaExhausted,
    /// The flow's LLM component failed to build.
    ModelBuildFailed,
    /// The bearer token was rejected.
    InvalidToken,
    /// The flow could not reach one of its own dependencies.
    ConnectionRefused,
}

impl UpstreamErrorClass {
    /// Match order. The first class whose marker occurs in a message wins.
    pub const ALL: [UpstreamErrorClass; 4] = [
        Self::QuotaExhausted,
        Self::ModelBuildFailed,
        Self::InvalidToken,
        Self::ConnectionRefused,
    ];

    /// Substring that identifies this class inside an upstream message.
    #[inline]
    pub fn marker(&self) -> &'static str {
        match self {
            Self::QuotaExhausted => "429 Resource has been exhausted",
            Self::ModelBuildFailed => "Error building Component Google Generative AI",
            Self::InvalidToken => "Invalid token",
            Self::ConnectionRefused => "Connection refused",
        }
    }

    /// Message shown to the user instead of the raw upstream text.
    #[inline]
    pub fn friendly_message(&self) -> &'static str {
        match self {
            Self::QuotaExhausted => "API quota has been exceeded. Please try again later.",
            Self::ModelBuildFailed => {
                "There was an issue with the AI model. Please try again later."
            }
            Self::InvalidToken => "Invalid API token. Please check your configuration.",
            Self::ConnectionRefused => {
                "Unable to connect to the server. Please check your internet connection."
            }
        }
    }

    /// Returns the snake_case name (e.g., `"quota_exhausted"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuotaExhausted => "quota_exhausted",
            Self::ModelBuildFailed => "model_build_failed",
            Self::InvalidToken => "invalid_token",
            Self::ConnectionRefused => "connection_refused",
        }
    }

    /// Scan `message` against the table in order; case-sensitive.
    pub fn classify(message: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| message.contains(class.marker()))
    }
}

impl fmt::Display for UpstreamErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_marker_classifies_to_itself() {
        for class in UpstreamErrorClass::ALL {
            let msg = format!("upstream said: {} (details)", class.marker());
            assert_eq!(UpstreamErrorClass::classify(&msg), Some(class));
        }
    }

    #[test]
    fn test_first_match_wins() {
        let msg = "Invalid token; also 429 Resource has been exhausted";
        assert_eq!(
            UpstreamErrorClass::classify(msg),
            Some(UpstreamErrorClass::QuotaExhausted)
        );
    }

    #[test]
    fn test_unknown_and_case_sensitive() {
        assert_eq!(UpstreamErrorClass::classify("something else broke"), None);
        assert_eq!(UpstreamErrorClass::classify("invalid TOKEN"), None);
        assert_eq!(UpstreamErrorClass::classify(""), None);
    }
}
