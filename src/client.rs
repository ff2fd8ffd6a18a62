//! 流程客户端：组装请求、发送、归一化响应。
//!
//! Client for a hosted flow.
//!
//! | Step | Module |
//! |------|--------|
//! | compose URL, body, headers | [`crate::protocol`] |
//! | one POST with a timeout | [`crate::transport`] |
//! | answer text or presentable error | [`normalize`] |
//!
//! ```rust,no_run
//! use flowchat::client::FlowClient;
//! use flowchat::types::Query;
//!
//! # async fn run() -> flowchat::Result<()> {
//! let client = FlowClient::from_env()?;
//! match client.ask(&Query::new("What is substance?")?).await {
//!     Ok(answer) => println!("{}", answer.text),
//!     Err(e) => eprintln!("{}", e.user_message),
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod normalize;

pub use builder::FlowClientBuilder;
pub use self::core::FlowClient;
pub use normalize::{normalize, RESULT_PATH};
