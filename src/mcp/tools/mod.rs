//! MCP Tools
//!
//! Tool implementations for projects, tables, and test execution.

pub mod projects;
pub mod tables;

use super::protocol::McpError;
use super::registry::McpRegistry;
use crate::openl::BridgeError;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    projects::register_tools(registry);
    tables::register_tools(registry);
    tests::register_tools(registry);
}

/// Map a bridge failure onto the MCP error surface.
///
/// Argument problems become JSON-RPC invalid-params; everything else is a
/// tool execution failure whose message keeps the structured context
/// (status code, endpoint) the caller needs to decide what to do next.
pub(crate) fn tool_error(err: BridgeError) -> McpError {
    match err {
        BridgeError::InvalidArgument(msg) => McpError::InvalidParams(msg),
        other => McpError::ToolExecutionFailed(other.to_string()),
    }
}
