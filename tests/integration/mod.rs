//! Integration tests with mock HTTP server

pub mod flow_client;
pub mod mock_server;
pub mod session;
