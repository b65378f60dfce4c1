#![allow(dead_code)] // Not every test binary uses every helper

//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests:
//! a fake OpenL REST service, the bridge server itself, and a WebSocket
//! MCP client. Tests should only import from this module, not from
//! internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeOpenl, McpTestClient, TestServer};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_start_and_poll() {
//!     let remote = FakeOpenl::builder().project("insurance", "OPENED").spawn().await;
//!     let server = TestServer::spawn(remote.base_url.clone()).await;
//!     let mut client = McpTestClient::connect_and_initialize(&server.ws_url()).await;
//!
//!     let report = client
//!         .call_tool_json("start_project_tests", json!({"project_id": "insurance"}))
//!         .await;
//!     assert_eq!(report["status"], "STARTED");
//! }
//! ```

mod client;
mod remote;
mod server;

// Public API - this is what tests import
pub use client::McpTestClient;
pub use remote::{test_case, FakeOpenl};
pub use server::TestServer;
