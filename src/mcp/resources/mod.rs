//! MCP Resources
//!
//! Read-only introspection: effective configuration and live test
//! sessions.

pub mod config;
pub mod sessions;

use super::registry::McpRegistry;

/// Register all resources with the registry
pub fn register_all_resources(registry: &mut McpRegistry) {
    config::register_resources(registry);
    sessions::register_resources(registry);
}
