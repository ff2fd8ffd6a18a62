//! Environment lookup as an injectable collaborator.

use std::collections::HashMap;

pub const ENV_BASE_URL: &str = "LANGFLOW_BASE_URL";
pub const ENV_FLOW_ID: &str = "LANGFLOW_ID";
pub const ENV_ENDPOINT: &str = "LANGFLOW_ENDPOINT";
pub const ENV_TOKEN: &str = "APPLICATION_TOKEN";
pub const ENV_ORG_ID: &str = "ORG_ID";
pub const ENV_TWEAKS: &str = "LANGFLOW_TWEAKS";
pub const ENV_TIMEOUT_MS: &str = "LANGFLOW_TIMEOUT_MS";
pub const ENV_API_SHAPE: &str = "LANGFLOW_API_SHAPE";

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}
