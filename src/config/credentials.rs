//! Stored credential sources.
//!
//! Nothing here is consulted unless the caller hands a source to the resolver.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keyring service name used by [`KeyringCredentials`].
pub const KEYRING_SERVICE: &str = "flowchat";

/// Connection values kept outside the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "orgId", alias = "org_id")]
    pub org_id: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub endpoint_id: Option<String>,
}

/// Something that may hold a [`CredentialRecord`].
///
/// Absence and unreadable records both yield `None`; neither is an error.
pub trait CredentialSource: Send + Sync {
    fn load(&self) -> Option<CredentialRecord>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// JSON (or YAML, by extension) record at an explicit path.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_yaml(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        )
    }

    fn parse(&self, contents: &str) -> Result<CredentialRecord, String> {
        if self.is_yaml() {
            serde_yaml::from_str(contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        }
    }
}

impl CredentialSource for CredentialFile {
    fn load(&self) -> Option<CredentialRecord> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential file not present");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "credential file unreadable, ignoring");
                return None;
            }
        };
        match self.parse(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "credential file unparseable, ignoring");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Token stored in the OS keyring under [`KEYRING_SERVICE`] / `account`.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    account: String,
}

impl KeyringCredentials {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new("default")
    }
}

impl CredentialSource for KeyringCredentials {
    fn load(&self) -> Option<CredentialRecord> {
        let entry = match keyring::Entry::new(KEYRING_SERVICE, &self.account) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "keyring unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(token) => Some(CredentialRecord {
                token: Some(token),
                ..CredentialRecord::default()
            }),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "keyring lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "keyring"
    }
}

/// In-memory record, for tests and for front-ends that collect credentials themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub CredentialRecord);

impl CredentialSource for StaticCredentials {
    fn load(&self) -> Option<CredentialRecord> {
        Some(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
