//! # flowchat
//!
//! 托管流程（Langflow 风格 "run a flow" API）的轻量客户端与命令行前端。
//!
//! A thin client for hosted "run a flow" APIs, plus a chat CLI on top of it.
//!
//! ## Overview
//!
//! A user question becomes one HTTP POST against a configured flow. The reply is
//! reduced to either an [`types::Answer`] (the text at a fixed path in the
//! response) or an [`AppError`] whose message is already fit to show a user.
//! Nothing in the request path panics, retries, or returns empty text silently.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowchat::config::{ConfigOverrides, ConfigResolver};
//! use flowchat::{FlowClient, Query};
//!
//! #[tokio::main]
//! async fn main() -> flowchat::Result<()> {
//!     let config = ConfigResolver::new().resolve(&ConfigOverrides::default())?;
//!     let client = FlowClient::new(config)?;
//!
//!     match client.ask(&Query::new("What is substance?")?).await {
//!         Ok(answer) => println!("{}", answer.text),
//!         Err(e) => eprintln!("{}", e.user_message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered configuration: overrides, env, credential source, defaults |
//! | [`types`] | `Query`, `Answer`, `Tweaks` |
//! | [`protocol`] | API shapes and request composition |
//! | [`transport`] | The `FlowTransport` seam and its reqwest implementation |
//! | [`client`] | `FlowClient` and response normalization |
//! | [`error_code`] | Known upstream error markers and their friendly messages |
//! | [`session`] | Per-session history and sticky session ids |
//! | [`utils`] | JSON path walking |

pub mod client;
pub mod config;
pub mod error;
pub mod error_code;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use client::{FlowClient, FlowClientBuilder};
pub use config::{ClientConfig, ConfigError, ConfigOverrides, ConfigResolver};
pub use error::{AppError, AppErrorKind, Error, ErrorContext};
pub use error_code::UpstreamErrorClass;
pub use session::{ChatSession, History, HistoryEntry, Role};
pub use types::{Answer, IoType, Query, Tweaks};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
