use crate::config::ConfigError;
use crate::transport::TransportError;
use serde_json::Value;
use thiserror::Error;

/// Fallback shown when an upstream error envelope carries no message.
pub const UNKNOWN_UPSTREAM_MESSAGE: &str = "An unknown error occurred. Please try again.";

/// Fallback shown when a response could not be interpreted at all.
pub const PARSE_FAILURE_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Configuration key or JSON path that caused the error (e.g., "base_url", "outputs[0]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "env", "credentials", "normalizer")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

pub(crate) fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// Which stage of a call produced an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppErrorKind {
    /// Network failure, timeout, or a body that was not JSON.
    Transport,
    /// The remote service answered with a structured error envelope.
    Upstream,
    /// The response did not have the shape we rely on.
    Parse,
}

impl AppErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Upstream => "upstream",
            Self::Parse => "parse",
        }
    }
}

impl std::fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed `ask`, already reduced to something a front-end can show.
///
/// `raw` keeps the offending response (or a diagnostic object) for inspection;
/// it is never needed to render the message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} error: {user_message}")]
pub struct AppError {
    pub kind: AppErrorKind,
    pub user_message: String,
    pub raw: Option<Value>,
}

impl AppError {
    pub fn new(kind: AppErrorKind, user_message: impl Into<String>) -> Self {
        Self {
            kind,
            user_message: user_message.into(),
            raw: None,
        }
    }

    pub fn upstream(user_message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Upstream, user_message)
    }

    pub fn parse(user_message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Parse, user_message)
    }

    pub fn transport(user_message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Transport, user_message)
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, AppErrorKind::Transport)
    }

    /// Diagnostic JSON suitable for writing next to a failed CLI call.
    pub fn diagnostic(&self) -> Value {
        serde_json::json!({
            "kind": self.kind.as_str(),
            "message": self.user_message,
            "raw": self.raw,
        })
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        let raw = match &err {
            TransportError::NonJson { status, body } => serde_json::json!({
                "status": status,
                "body": body,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };
        AppError::transport(err.user_message()).with_raw(raw)
    }
}

/// Crate-level error for everything outside the `ask` boundary
/// (resolution, input validation, serialization).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Request failed: {0}")]
    App(#[from] AppError),

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }
}
