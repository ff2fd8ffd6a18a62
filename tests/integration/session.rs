//! Chat sessions against a mock flow server.

use crate::integration::mock_server::{run_path, success_body, MockServerFixture};
use flowchat::protocol::ApiShape;
use flowchat::{ChatSession, Query, Role};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_error_turn_stays_in_history() {
    let mut fixture = MockServerFixture::new().await;
    let _ok = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_body(Matcher::PartialJson(json!({"input_value": "first"})))
        .with_status(200)
        .with_body(success_body("answer one").to_string())
        .create_async()
        .await;
    let _bad = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_body(Matcher::PartialJson(json!({"input_value": "second"})))
        .with_status(401)
        .with_body(json!({"detail": {"message": "Invalid token"}}).to_string())
        .create_async()
        .await;

    let client = fixture.client(fixture.config());
    let mut session = ChatSession::new();
    session
        .submit(&client, Query::new("first").unwrap())
        .await
        .unwrap();
    session
        .submit(&client, Query::new("second").unwrap())
        .await
        .unwrap_err();

    let entries = session.history().all();
    let roles: Vec<Role> = entries.iter().map(|e| e.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(entries[1].content, "answer one");
    assert!(!entries[1].is_error);
    assert!(entries[3].is_error);
    assert_eq!(
        entries[3].content,
        "Invalid API token. Please check your configuration."
    );
}

#[tokio::test]
async fn test_hosted_session_shape_sends_generated_id() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_body(Matcher::Regex(r#""session_id":"[0-9a-f-]{36}""#.to_string()))
        .with_status(200)
        .with_body(success_body("ok").to_string())
        .create_async()
        .await;

    let config = fixture.config().with_api_shape(ApiShape::HostedSession);
    let client = fixture.client(config);
    let mut session = ChatSession::new();
    session
        .submit(&client, Query::new("hi").unwrap())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blank_query_session_uses_sticky_id() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", run_path().as_str())
        .match_body(Matcher::PartialJson(json!({"session_id": "sticky"})))
        .with_status(200)
        .with_body(success_body("remembered").to_string())
        .create_async()
        .await;

    let client = fixture.client(fixture.config());
    let mut session = ChatSession::with_session_id("sticky");
    let answer = session
        .submit(&client, Query::new("hi").unwrap().session_id(""))
        .await
        .unwrap();
    assert_eq!(answer.text, "remembered");
    mock.assert_async().await;
}
