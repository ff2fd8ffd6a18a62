use crate::client::builder::FlowClientBuilder;
use crate::client::normalize::normalize;
use crate::config::{ClientConfig, ConfigOverrides, ConfigResolver};
use crate::error::AppError;
use crate::protocol;
use crate::transport::FlowTransport;
use crate::types::{Answer, Query};
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Client for one configured flow.
///
/// Cheap to clone; the config and transport are shared. Every call to
/// [`ask`](Self::ask) makes exactly one HTTP attempt.
#[derive(Clone)]
pub struct FlowClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<dyn FlowTransport>,
    pub(crate) timeout: Duration,
}

impl FlowClient {
    /// Client over the default HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        FlowClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> FlowClientBuilder {
        FlowClientBuilder::new(config)
    }

    /// Resolve configuration from the process environment and hosted defaults.
    pub fn from_env() -> Result<Self> {
        let config = ConfigResolver::new().resolve(&ConfigOverrides::default())?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the flow once for `query`.
    ///
    /// Never panics and never returns an empty answer on failure: every
    /// failure is reduced to an [`AppError`] with a presentable message.
    pub async fn ask(&self, query: &Query) -> std::result::Result<Answer, AppError> {
        let request = protocol::build(query, &self.config).map_err(|e| {
            warn!(error = %e, "could not compose flow request");
            AppError::transport("The request could not be prepared. Please check your configuration.")
                .with_raw(serde_json::json!({ "error": e.to_string() }))
        })?;

        let started = Instant::now();
        let sent = self.transport.send(&request, self.timeout).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    url = request.url.as_str(),
                    duration_ms = elapsed_ms,
                    error = %e,
                    "flow transport failed"
                );
                return Err(AppError::from(e));
            }
        };

        info!(
            http_status = response.status,
            duration_ms = elapsed_ms,
            session_id = request.session_id().unwrap_or(""),
            "flow call completed"
        );

        normalize(response, elapsed_ms)
    }

    /// Convenience for a plain chat question with no overrides.
    pub async fn ask_text(&self, text: &str) -> Result<Answer> {
        let query = Query::new(text)?;
        Ok(self.ask(&query).await?)
    }
}

impl std::fmt::Debug for FlowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowClient")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
