//! Mock HTTP server setup for integration tests

use flowchat::{ClientConfig, FlowClient};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

pub const FLOW_ID: &str = "flow-123";
pub const ENDPOINT: &str = "endpoint-abc";

/// Path the hosted shape posts to for [`FLOW_ID`] and [`ENDPOINT`].
pub fn run_path() -> String {
    format!("/lf/{FLOW_ID}/api/v1/run/{ENDPOINT}")
}

/// A success body carrying `text` at the fixed result path.
pub fn success_body(text: &str) -> Value {
    json!({
        "session_id": "sess",
        "outputs": [{
            "inputs": {"input_value": "question"},
            "outputs": [{
                "results": {"message": {"text": text, "sender": "Machine", "sender_name": "AI"}},
                "artifacts": {"message": text}
            }]
        }]
    })
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Config pointed at the mock server, no token, no default tweaks.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url, FLOW_ID, ENDPOINT).unwrap()
    }

    pub fn client(&self, config: ClientConfig) -> FlowClient {
        FlowClient::new(config).unwrap()
    }

    /// Create a mock for a JSON response on the run path
    pub async fn mock_json_response(&mut self, status: usize, body: &Value) -> Mock {
        self.server
            .mock("POST", run_path().as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create a mock that only matches the given JSON body
    pub async fn mock_expecting_body(&mut self, expected: Value, reply: &Value) -> Mock {
        self.server
            .mock("POST", run_path().as_str())
            .match_body(Matcher::Json(expected))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply.to_string())
            .create_async()
            .await
    }
}
