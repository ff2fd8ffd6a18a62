use crate::client::core::FlowClient;
use crate::config::ClientConfig;
use crate::transport::{FlowTransport, HttpTransport};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`FlowClient`].
///
/// Keep this surface area small: a config, optionally a transport, optionally
/// a timeout that differs from the config's.
pub struct FlowClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn FlowTransport>>,
    timeout: Option<Duration>,
}

impl FlowClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            timeout: None,
        }
    }

    /// Inject a transport. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn FlowTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the per-call timeout carried by the config.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<FlowClient> {
        let transport: Arc<dyn FlowTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new()?),
        };
        let timeout = self.timeout.unwrap_or_else(|| self.config.timeout());

        Ok(FlowClient {
            config: Arc::new(self.config),
            transport,
            timeout,
        })
    }
}
