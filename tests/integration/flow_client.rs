//! End-to-end `FlowClient::ask` against a mock flow server.

use crate::integration::mock_server::{run_path, success_body, MockServerFixture, ENDPOINT};
use flowchat::protocol::ApiShape;
use flowchat::{AppErrorKind, ClientConfig, FlowClient, Query, Tweaks};
use mockito::Matcher;
use serde_json::{json, Map};
use std::time::Duration;

#[tokio::test]
async fn test_success_returns_exact_text() {
    let mut fixture = MockServerFixture::new().await;
    let text = "Substance is that which has qualities and modes.";
    let expected = json!({
        "input_value": "What is substance?",
        "output_type": "chat",
        "input_type": "chat",
    });
    let mock = fixture
        .mock_expecting_body(expected, &success_body(text))
        .await;

    let client = fixture.client(fixture.config());
    let answer = client
        .ask(&Query::new("What is substance?").unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer.text, text);
    assert_eq!(answer.raw, success_body(text));
}

#[tokio::test]
async fn test_quota_error_envelope() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            500,
            &json!({"detail": {"message": "429 Resource has been exhausted"}}),
        )
        .await;

    let client = fixture.client(fixture.config());
    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Upstream);
    assert_eq!(
        err.user_message,
        "API quota has been exceeded. Please try again later."
    );
    assert!(err.raw.is_some());
}

#[tokio::test]
async fn test_double_encoded_detail_on_success_status() {
    let mut fixture = MockServerFixture::new().await;
    let detail = json!({"message": "Error building Component Google Generative AI: bad key"});
    let _mock = fixture
        .mock_json_response(200, &json!({ "detail": detail.to_string() }))
        .await;

    let client = fixture.client(fixture.config());
    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Upstream);
    assert_eq!(
        err.user_message,
        "There was an issue with the AI model. Please try again later."
    );
}

#[tokio::test]
async fn test_missing_result_path_is_parse_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(200, &json!({"outputs": [{"outputs": []}]}))
        .await;

    let client = fixture.client(fixture.config());
    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Parse);
    assert!(err.user_message.contains("[0]"), "{}", err.user_message);
}

#[tokio::test]
async fn test_non_json_body_is_transport_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", run_path().as_str())
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let client = fixture.client(fixture.config());
    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Transport);
    let raw = err.raw.unwrap();
    assert_eq!(raw["status"], 502);
    assert_eq!(raw["body"], "<html>Bad Gateway</html>");
}

#[tokio::test]
async fn test_headers_sent_only_when_configured() {
    let mut fixture = MockServerFixture::new().await;
    let authed = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_header("authorization", "Bearer AstraCS:secret")
        .match_header("x-org-id", "org-42")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(success_body("ok").to_string())
        .create_async()
        .await;

    let config = fixture
        .config()
        .with_token("AstraCS:secret")
        .with_org_id("org-42");
    let answer = fixture
        .client(config)
        .ask(&Query::new("hi").unwrap())
        .await
        .unwrap();
    assert_eq!(answer.text, "ok");
    authed.assert_async().await;

    let anonymous = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_header("authorization", Matcher::Missing)
        .match_header("x-org-id", Matcher::Missing)
        .with_status(200)
        .with_body(success_body("anon").to_string())
        .create_async()
        .await;

    let answer = fixture
        .client(fixture.config())
        .ask(&Query::new("hi").unwrap())
        .await
        .unwrap();
    assert_eq!(answer.text, "anon");
    anonymous.assert_async().await;
}

#[tokio::test]
async fn test_tweaks_and_session_reach_the_body() {
    let mut fixture = MockServerFixture::new().await;
    let mut fields = Map::new();
    fields.insert("temperature".into(), json!(0.2));
    let expected = json!({
        "input_value": "hi",
        "output_type": "text",
        "input_type": "chat",
        "session_id": "s-9",
        "tweaks": {"Model-1": {"temperature": 0.2}, "Prompt-1": {}},
    });
    let mock = fixture
        .mock_expecting_body(expected, &success_body("ok"))
        .await;

    let config = fixture
        .config()
        .with_default_tweaks(Tweaks::new().with_component("Prompt-1", Map::new()));
    let query = Query::new("hi")
        .unwrap()
        .output_type(flowchat::IoType::Text)
        .session_id("s-9")
        .tweaks(Tweaks::new().with_component("Model-1", fields));

    fixture.client(config).ask(&query).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_self_hosted_path() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", format!("/api/v1/run/{ENDPOINT}").as_str())
        .with_status(200)
        .with_body(success_body("local").to_string())
        .create_async()
        .await;

    let config = fixture.config().with_api_shape(ApiShape::SelfHosted);
    let answer = fixture
        .client(config)
        .ask(&Query::new("hi").unwrap())
        .await
        .unwrap();
    assert_eq!(answer.text, "local");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(format!("http://127.0.0.1:{port}"), "f", "e").unwrap();
    let client = FlowClient::new(config).unwrap();

    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Transport);
    assert_eq!(
        err.user_message,
        "Unable to connect to the server. Please check your internet connection."
    );
}

#[tokio::test]
async fn test_timeout_surfaces_promptly() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _holder = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let config = ClientConfig::new(format!("http://{addr}"), "f", "e")
        .unwrap()
        .with_timeout_ms(200);
    let client = FlowClient::new(config).unwrap();

    let started = std::time::Instant::now();
    let err = client.ask(&Query::new("hi").unwrap()).await.unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Transport);
    assert_eq!(err.user_message, "The request timed out. Please try again.");
    assert!(started.elapsed() < Duration::from_secs(5));
}
