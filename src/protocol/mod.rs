//! 协议适配层：描述远端运行接口的形态，并将查询编译为线上请求。
//!
//! # Protocol Layer
//!
//! The remote "run a flow" API has changed shape over time. This module keeps
//! that variability in one place:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`shape`] | [`ApiShape`] selector: URL template and session rules |
//! | [`request`] | [`build`]: `Query` + `ClientConfig` → URL, JSON body, headers |
//!
//! ## Example
//!
//! ```rust
//! use flowchat::config::ClientConfig;
//! use flowchat::protocol::build;
//! use flowchat::types::Query;
//!
//! let config = ClientConfig::new("https://api.example.com", "flow-1", "ep-1").unwrap();
//! let request = build(&Query::new("Hello").unwrap(), &config).unwrap();
//! assert_eq!(request.url, "https://api.example.com/lf/flow-1/api/v1/run/ep-1");
//! assert_eq!(request.body["input_value"], "Hello");
//! ```

pub mod request;
pub mod shape;

pub use request::{build, FlowRequest, ORG_ID_HEADER};
pub use shape::ApiShape;
