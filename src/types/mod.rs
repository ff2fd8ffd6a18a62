//! 类型系统模块：定义查询、回答与组件覆盖参数等核心数据类型。
//!
//! # Types Module
//!
//! Core values exchanged between front-ends and the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Query`] | One user turn: text, io modes, tweaks, optional session id |
//! | [`IoType`] | `chat` or `text` |
//! | [`Tweaks`] | Per-component override map |
//! | [`Answer`] | Extracted text plus the raw response |
//!
//! ## Example
//!
//! ```rust
//! use flowchat::types::{IoType, Query, Tweaks};
//!
//! let query = Query::new("What is substance?")
//!     .unwrap()
//!     .output_type(IoType::Text)
//!     .tweaks(Tweaks::from_json_str(r#"{"Prompt-BONxv": {}}"#).unwrap());
//! assert_eq!(query.text(), "What is substance?");
//! ```

pub mod answer;
pub mod query;
pub mod tweaks;

pub use answer::Answer;
pub use query::{IoType, Query};
pub use tweaks::Tweaks;
