//! Config Resources
//!
//! Resources for accessing the bridge configuration.

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::ResourceContent;
use crate::mcp::registry::{McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult};

/// Register config resources with the registry
pub fn register_resources(registry: &mut McpRegistry) {
    registry.register_resource(bridge_config_resource());
}

// ============================================================================
// bridge://config
// ============================================================================

fn bridge_config_resource() -> RegisteredResource {
    ResourceBuilder::new("bridge://config", "Bridge Configuration")
        .description("Effective bridge configuration (credentials omitted)")
        .mime_type("application/json")
        .build(bridge_config_handler)
}

async fn bridge_config_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let mut config_view = ctx.config.sanitized_json();
    config_view["runtime"] = serde_json::json!({
        "version": ctx.server_version.clone(),
        "uptime_secs": ctx.start_time.elapsed().as_secs(),
    });

    let content = ResourceContent::Text {
        uri,
        mime_type: Some("application/json".to_string()),
        text: serde_json::to_string_pretty(&config_view).unwrap_or_default(),
    };

    Ok(vec![content])
}
