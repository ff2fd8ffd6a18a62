//! 会话与历史：按顺序记录一次会话内的问答与错误。
//!
//! Per-session chat history.
//!
//! [`History`] is an append-only ordered log of [`HistoryEntry`] values. It is
//! owned by one [`ChatSession`] and never shared; only an explicit
//! [`ChatSession::new_session`] clears it.
//!
//! ```rust,no_run
//! use flowchat::client::FlowClient;
//! use flowchat::session::ChatSession;
//! use flowchat::types::Query;
//!
//! # async fn run(client: FlowClient) -> flowchat::Result<()> {
//! let mut session = ChatSession::with_generated_session();
//! let _ = session.submit(&client, Query::new("What is substance?")?).await;
//! for entry in session.history().all() {
//!     println!("{}: {}", entry.role, entry.content);
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::FlowClient;
use crate::error::AppError;
use crate::types::{Answer, Query};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One rendered turn. Errors are assistant entries with `is_error` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub response_time_ms: Option<u64>,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_error: false,
            response_time_ms: None,
        }
    }

    pub fn assistant(answer: &Answer) -> Self {
        Self {
            role: Role::Assistant,
            content: answer.text.clone(),
            is_error: false,
            response_time_ms: Some(answer.elapsed_ms),
        }
    }

    pub fn error(err: &AppError, response_time_ms: Option<u64>) -> Self {
        Self {
            role: Role::Assistant,
            content: err.user_message.clone(),
            is_error: true,
            response_time_ms,
        }
    }
}

/// Append-only log. There is no removal other than [`clear`](Self::clear).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Snapshot in insertion order.
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One conversation: its history and an optional sticky upstream session id.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: History,
    session_id: Option<String>,
}

impl ChatSession {
    /// No sticky session id; each turn is independent upstream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sticky session id. A blank id means none.
    pub fn with_session_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            history: History::new(),
            session_id: Some(id).filter(|id| !id.trim().is_empty()),
        }
    }

    /// Sticky session id generated locally, so upstream memory follows the chat.
    pub fn with_generated_session() -> Self {
        Self::with_session_id(Uuid::new_v4().to_string())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Start over: clear history and, if a sticky id was in use, replace it.
    pub fn new_session(&mut self) {
        self.history.clear();
        if self.session_id.is_some() {
            self.session_id = Some(Uuid::new_v4().to_string());
        }
        debug!(session_id = self.session_id.as_deref().unwrap_or(""), "session reset");
    }

    /// Ask `client` and record the turn.
    ///
    /// The query's own non-blank `session_id` wins; otherwise the sticky one
    /// is applied. A failure is recorded as an error entry and also returned.
    pub async fn submit(
        &mut self,
        client: &FlowClient,
        mut query: Query,
    ) -> Result<Answer, AppError> {
        if query.session_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            query.session_id = self.session_id.clone();
        }
        self.history.append(HistoryEntry::user(query.text()));

        let started = Instant::now();
        let outcome = client.ask(&query).await;
        match &outcome {
            Ok(answer) => self.history.append(HistoryEntry::assistant(answer)),
            Err(err) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                self.history.append(HistoryEntry::error(err, Some(elapsed_ms)))
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::AppErrorKind;
    use crate::protocol::FlowRequest;
    use crate::transport::{FlowTransport, RawResponse, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Echoes the question back, or fails when it says "fail".
    #[derive(Default)]
    struct Echo {
        sessions: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl FlowTransport for Echo {
        async fn send(
            &self,
            request: &FlowRequest,
            _timeout: Duration,
        ) -> Result<RawResponse, TransportError> {
            self.sessions
                .lock()
                .unwrap()
                .push(request.session_id().map(str::to_string));
            let input = request.body["input_value"].as_str().unwrap_or_default();
            if input == "fail" {
                return Ok(RawResponse {
                    status: 500,
                    body: json!({"detail": {"message": "429 Resource has been exhausted"}}),
                });
            }
            Ok(RawResponse {
                status: 200,
                body: json!({"outputs": [{"outputs": [{"results": {"message": {"text": format!("re: {input}")}}}]}]}),
            })
        }
    }

    fn client() -> (FlowClient, Arc<Echo>) {
        let echo = Arc::new(Echo::default());
        let config = ClientConfig::new("https://api.example.com", "flow", "ep").unwrap();
        let client = FlowClient::builder(config)
            .transport(echo.clone())
            .build()
            .unwrap();
        (client, echo)
    }

    #[test]
    fn test_history_is_ordered_and_append_only() {
        let mut h = History::new();
        assert!(h.is_empty());
        h.append(HistoryEntry::user("a"));
        h.append(HistoryEntry::error(&AppError::parse("bad"), Some(3)));
        assert_eq!(h.len(), 2);
        assert_eq!(h.all()[0].content, "a");
        assert!(h.last().unwrap().is_error);
        assert_eq!(h.last().unwrap().response_time_ms, Some(3));
    }

    #[tokio::test]
    async fn test_submit_records_success_and_error_turns() {
        let (client, _) = client();
        let mut session = ChatSession::new();

        let answer = session.submit(&client, Query::new("hello").unwrap()).await.unwrap();
        assert_eq!(answer.text, "re: hello");

        let err = session.submit(&client, Query::new("fail").unwrap()).await.unwrap_err();
        assert_eq!(err.kind, AppErrorKind::Upstream);

        let entries = session.history().all();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], HistoryEntry::user("hello"));
        assert_eq!(entries[1].role, Role::Assistant);
        assert!(!entries[1].is_error);
        assert!(entries[1].response_time_ms.is_some());
        assert_eq!(entries[2].content, "fail");
        assert!(entries[3].is_error);
        assert!(entries[3].response_time_ms.is_some());
        assert_eq!(
            entries[3].content,
            "API quota has been exceeded. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_sticky_session_id_and_reset() {
        let (client, echo) = client();
        let mut session = ChatSession::with_session_id("s-1");

        session.submit(&client, Query::new("one").unwrap()).await.unwrap();
        session
            .submit(&client, Query::new("two").unwrap().session_id("explicit"))
            .await
            .unwrap();

        session.new_session();
        assert!(session.history().is_empty());
        let fresh = session.session_id().unwrap().to_string();
        assert_ne!(fresh, "s-1");

        session.submit(&client, Query::new("three").unwrap()).await.unwrap();

        let seen = echo.sessions.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![Some("s-1".to_string()), Some("explicit".to_string()), Some(fresh)]
        );
    }

    #[tokio::test]
    async fn test_blank_query_session_falls_back_to_sticky_id() {
        let (client, echo) = client();
        let mut session = ChatSession::with_session_id("sticky");
        session
            .submit(&client, Query::new("hi").unwrap().session_id(""))
            .await
            .unwrap();
        assert_eq!(
            echo.sessions.lock().unwrap().clone(),
            vec![Some("sticky".to_string())]
        );
    }

    #[tokio::test]
    async fn test_blank_sticky_id_is_no_session() {
        let (client, echo) = client();
        let mut session = ChatSession::with_session_id("  ");
        assert!(session.session_id().is_none());
        session.submit(&client, Query::new("hi").unwrap()).await.unwrap();
        session.new_session();
        assert!(session.session_id().is_none());
        assert_eq!(echo.sessions.lock().unwrap().clone(), vec![None]);
    }

    #[tokio::test]
    async fn test_plain_session_sends_no_id() {
        let (client, echo) = client();
        let mut session = ChatSession::new();
        session.submit(&client, Query::new("x").unwrap()).await.unwrap();
        session.new_session();
        assert!(session.session_id().is_none());
        assert_eq!(echo.sessions.lock().unwrap().clone(), vec![None]);
    }
}
