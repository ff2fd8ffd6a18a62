//! 连接配置：按“显式参数 > 环境变量 > 凭据记录 > 内置默认值”的顺序解析。
//!
//! # Configuration
//!
//! [`ConfigResolver`] assembles one immutable [`ClientConfig`] from layered
//! sources. Each field is resolved independently, highest priority first:
//!
//! 1. explicit [`ConfigOverrides`]
//! 2. environment ([`EnvSource`], the process env by default)
//! 3. a stored [`CredentialRecord`] (only if a [`CredentialSource`] was supplied)
//! 4. compiled-in [`Defaults`]
//!
//! Empty strings count as absent at every layer.
//!
//! ## Example
//!
//! ```rust
//! use flowchat::config::{ConfigOverrides, ConfigResolver, MapEnv};
//!
//! let resolver = ConfigResolver::new().with_env(MapEnv::new().with("ORG_ID", "org-7"));
//! let config = resolver
//!     .resolve(&ConfigOverrides {
//!         token: Some("AstraCS:example".into()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(config.org_id(), Some("org-7"));
//! assert!(config.has_token());
//! ```

pub mod credentials;
pub mod env;

pub use credentials::{
    CredentialFile, CredentialRecord, CredentialSource, KeyringCredentials, StaticCredentials,
};
pub use env::{EnvSource, MapEnv, ProcessEnv};

use crate::protocol::ApiShape;
use crate::types::Tweaks;
use serde_json::Map;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.langflow.astra.datastax.com";
pub const DEFAULT_FLOW_ID: &str = "6cb8d6b9-cc9a-4abc-92a9-aa41bf5d93eb";
pub const DEFAULT_ENDPOINT_ID: &str = "4fb7c099-22dd-43d9-b9ec-0a403a68f9e3";
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Component ids of the default flow; each gets an empty override entry.
pub const DEFAULT_TWEAK_COMPONENTS: [&str; 6] = [
    "ChatInput-HdACw",
    "ChatOutput-dzZWQ",
    "ParseData-PSHqh",
    "File-6yiwZ",
    "Prompt-BONxv",
    "GoogleGenerativeAIModel-nVd6m",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting '{field}' (set {env_var} or pass it explicitly)")]
    MissingField {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Connection parameters for one deployment. Immutable once built.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    flow_id: String,
    endpoint_id: String,
    org_id: Option<String>,
    token: Option<String>,
    default_tweaks: Tweaks,
    timeout_ms: u64,
    api_shape: ApiShape,
}

impl ClientConfig {
    /// Build a config directly, bypassing the layered sources.
    pub fn new(
        base_url: impl Into<String>,
        flow_id: impl Into<String>,
        endpoint_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&base_url.into())?;
        let flow_id = required("flow_id", env::ENV_FLOW_ID, Some(flow_id.into()))?;
        let endpoint_id = required("endpoint_id", env::ENV_ENDPOINT, Some(endpoint_id.into()))?;
        Ok(Self {
            base_url,
            flow_id,
            endpoint_id,
            org_id: None,
            token: None,
            default_tweaks: Tweaks::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_shape: ApiShape::default(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = non_empty(Some(token.into()));
        self
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = non_empty(Some(org_id.into()));
        self
    }

    pub fn with_default_tweaks(mut self, tweaks: Tweaks) -> Self {
        self.default_tweaks = tweaks;
        self
    }

    /// Per-call timeout. Zero is raised to 1 ms here; [`ConfigResolver`]
    /// rejects a zero timeout from its sources instead.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.max(1);
        self
    }

    pub fn with_api_shape(mut self, shape: ApiShape) -> Self {
        self.api_shape = shape;
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn default_tweaks(&self) -> &Tweaks {
        &self.default_tweaks
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    pub fn api_shape(&self) -> ApiShape {
        self.api_shape
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("flow_id", &self.flow_id)
            .field("endpoint_id", &self.endpoint_id)
            .field("org_id", &self.org_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("default_tweaks", &self.default_tweaks)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_shape", &self.api_shape)
            .finish()
    }
}

/// Caller-supplied values; every `Some` wins over all other sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub flow_id: Option<String>,
    pub endpoint_id: Option<String>,
    pub org_id: Option<String>,
    pub token: Option<String>,
    pub default_tweaks: Option<Tweaks>,
    pub timeout_ms: Option<u64>,
    pub api_shape: Option<ApiShape>,
}

/// Lowest-priority layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub base_url: Option<String>,
    pub flow_id: Option<String>,
    pub endpoint_id: Option<String>,
    pub default_tweaks: Tweaks,
    pub timeout_ms: u64,
    pub api_shape: ApiShape,
}

impl Defaults {
    /// The hosted deployment this crate ships with.
    pub fn hosted() -> Self {
        let tweaks = DEFAULT_TWEAK_COMPONENTS
            .iter()
            .map(|c| (c.to_string(), Map::new()))
            .collect();
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            flow_id: Some(DEFAULT_FLOW_ID.to_string()),
            endpoint_id: Some(DEFAULT_ENDPOINT_ID.to_string()),
            default_tweaks: tweaks,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_shape: ApiShape::Hosted,
        }
    }

    /// No connection defaults: every identifier must come from another layer.
    pub fn empty() -> Self {
        Self {
            base_url: None,
            flow_id: None,
            endpoint_id: None,
            default_tweaks: Tweaks::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_shape: ApiShape::Hosted,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::hosted()
    }
}

/// Layered resolution of [`ClientConfig`].
pub struct ConfigResolver {
    env: Box<dyn EnvSource>,
    credentials: Option<Box<dyn CredentialSource>>,
    defaults: Defaults,
}

impl ConfigResolver {
    /// Process environment, no credential source, hosted defaults.
    pub fn new() -> Self {
        Self {
            env: Box::new(ProcessEnv),
            credentials: None,
            defaults: Defaults::hosted(),
        }
    }

    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Opt in to a stored credential record.
    pub fn with_credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Box::new(source));
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn env_var(&self, key: &str) -> Option<String> {
        non_empty(self.env.var(key))
    }

    /// Resolve every field. Only a missing `base_url` or `flow_id` is fatal.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ClientConfig, ConfigError> {
        let record = match &self.credentials {
            Some(source) => {
                let record = source.load();
                debug!(
                    source = source.name(),
                    found = record.is_some(),
                    "credential source consulted"
                );
                record.unwrap_or_default()
            }
            None => CredentialRecord::default(),
        };

        let base_url = required(
            "base_url",
            env::ENV_BASE_URL,
            first_of([
                overrides.base_url.clone(),
                self.env_var(env::ENV_BASE_URL),
                record.base_url.clone(),
                self.defaults.base_url.clone(),
            ]),
        )?;
        let base_url = normalize_base_url(&base_url)?;

        let flow_id = required(
            "flow_id",
            env::ENV_FLOW_ID,
            first_of([
                overrides.flow_id.clone(),
                self.env_var(env::ENV_FLOW_ID),
                record.flow_id.clone(),
                self.defaults.flow_id.clone(),
            ]),
        )?;

        // An unset endpoint runs the flow by its own id.
        let endpoint_id = first_of([
            overrides.endpoint_id.clone(),
            self.env_var(env::ENV_ENDPOINT),
            record.endpoint_id.clone(),
            self.defaults.endpoint_id.clone(),
        ])
        .unwrap_or_else(|| flow_id.clone());

        let org_id = first_of([
            overrides.org_id.clone(),
            self.env_var(env::ENV_ORG_ID),
            record.org_id.clone(),
        ]);

        let token = first_of([
            overrides.token.clone(),
            self.env_var(env::ENV_TOKEN),
            record.token.clone(),
        ]);
        if let Some(t) = &token {
            validate_header_value("token", t)?;
        }
        if let Some(o) = &org_id {
            validate_header_value("org_id", o)?;
        }

        let default_tweaks = match &overrides.default_tweaks {
            Some(t) => t.clone(),
            None => match self.env_var(env::ENV_TWEAKS) {
                Some(raw) => Tweaks::from_json_str(&raw).map_err(|e| ConfigError::InvalidValue {
                    field: "default_tweaks",
                    reason: e.to_string(),
                })?,
                None => self.defaults.default_tweaks.clone(),
            },
        };

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => match self.env_var(env::ENV_TIMEOUT_MS) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    field: "timeout_ms",
                    reason: e.to_string(),
                })?,
                None => self.defaults.timeout_ms,
            },
        };
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }

        let api_shape = match overrides.api_shape {
            Some(shape) => shape,
            None => match self.env_var(env::ENV_API_SHAPE) {
                Some(raw) => raw
                    .parse::<ApiShape>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        field: "api_shape",
                        reason,
                    })?,
                None => self.defaults.api_shape,
            },
        };

        if token.is_none() {
            warn!("no application token configured; requests will be sent unauthenticated");
        }
        debug!(
            base_url = base_url.as_str(),
            flow_id = flow_id.as_str(),
            endpoint_id = endpoint_id.as_str(),
            has_token = token.is_some(),
            has_org_id = org_id.is_some(),
            api_shape = api_shape.as_str(),
            timeout_ms,
            "resolved client configuration"
        );

        Ok(ClientConfig {
            base_url,
            flow_id,
            endpoint_id,
            org_id,
            token,
            default_tweaks,
            timeout_ms,
            api_shape,
        })
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_of<const N: usize>(layers: [Option<String>; N]) -> Option<String> {
    layers.into_iter().find_map(non_empty)
}

fn required(
    field: &'static str,
    env_var: &'static str,
    value: Option<String>,
) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingField { field, env_var })
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        field: "base_url",
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            field: "base_url",
            reason: format!("expected an http(s) URL, got '{trimmed}'"),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_header_value(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "contains control characters".into(),
        });
    }
    Ok(())
}
