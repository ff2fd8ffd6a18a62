//! Known shapes of the remote run endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which URL template and session rules a deployment expects.
///
/// | Shape | Path | `session_id` |
/// |-------|------|--------------|
/// | `Hosted` | `/lf/{flow_id}/api/v1/run/{endpoint}` | only if supplied |
/// | `HostedSession` | `/lf/{flow_id}/api/v1/run/{endpoint}` | always, generated if absent |
/// | `SelfHosted` | `/api/v1/run/{endpoint}` | only if supplied |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiShape {
    #[default]
    Hosted,
    HostedSession,
    SelfHosted,
}

impl ApiShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiShape::Hosted => "hosted",
            ApiShape::HostedSession => "hosted-session",
            ApiShape::SelfHosted => "self-hosted",
        }
    }

    /// Whether every request must carry a `session_id`.
    pub fn requires_session(&self) -> bool {
        matches!(self, ApiShape::HostedSession)
    }

    /// Path segments appended to the base URL, unescaped.
    pub fn path_segments<'a>(&self, flow_id: &'a str, endpoint: &'a str) -> Vec<&'a str> {
        match self {
            ApiShape::Hosted | ApiShape::HostedSession => {
                vec!["lf", flow_id, "api", "v1", "run", endpoint]
            }
            ApiShape::SelfHosted => vec!["api", "v1", "run", endpoint],
        }
    }
}

impl fmt::Display for ApiShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "hosted" => Ok(ApiShape::Hosted),
            "hosted-session" => Ok(ApiShape::HostedSession),
            "self-hosted" => Ok(ApiShape::SelfHosted),
            other => Err(format!(
                "unknown api shape '{other}' (expected hosted, hosted-session or self-hosted)"
            )),
        }
    }
}
