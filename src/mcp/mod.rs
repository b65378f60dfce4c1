//! MCP (Model Context Protocol) Server
//!
//! Exposes the rules-service bridge as MCP tools and resources for LLM
//! clients.
//!
//! ## Architecture
//!
//! - Transport: WebSocket at `/v1/mcp`
//! - Tools: a closed, registry-dispatched set; Write-category tools are
//!   hidden and refused in read-only mode
//! - Resources: read-only introspection (config, active test sessions)

pub mod context;
pub mod handler;
pub mod protocol;
pub mod rate_limit;
pub mod registry;
pub mod resources;
pub mod tools;

pub use handler::mcp_handler;
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
