//! One user turn, as handed to the client.

use crate::types::tweaks::Tweaks;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input/output mode of a flow run (`input_type` / `output_type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    #[default]
    Chat,
    Text,
}

impl IoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoType::Chat => "chat",
            IoType::Text => "text",
        }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IoType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(IoType::Chat),
            "text" => Ok(IoType::Text),
            other => Err(format!("unknown io type '{other}' (expected chat or text)")),
        }
    }
}

/// A single question plus the knobs that shape how the flow runs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    pub input_type: IoType,
    pub output_type: IoType,
    pub tweaks: Tweaks,
    pub session_id: Option<String>,
    /// Run-path segment for this call only; falls back to the configured endpoint.
    pub endpoint: Option<String>,
}

impl Query {
    /// Create a chat/chat query. Blank text is rejected.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::validation_with_context(
                "query text must not be empty",
                ErrorContext::new().with_field_path("text"),
            ));
        }
        Ok(Self {
            text,
            input_type: IoType::Chat,
            output_type: IoType::Chat,
            tweaks: Tweaks::new(),
            session_id: None,
            endpoint: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input_type(mut self, io: IoType) -> Self {
        self.input_type = io;
        self
    }

    pub fn output_type(mut self, io: IoType) -> Self {
        self.output_type = io;
        self
    }

    pub fn tweaks(mut self, tweaks: Tweaks) -> Self {
        self.tweaks = tweaks;
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
