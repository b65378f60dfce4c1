//! Session Resources
//!
//! Read-only view of the live test-session records.

use serde_json::json;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ResourceContent};
use crate::mcp::registry::{McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult};
use crate::test_runs::SessionRecord;

/// Register session resources with the registry
pub fn register_resources(registry: &mut McpRegistry) {
    registry.register_resource(active_sessions_resource());
    registry.register_resource(project_session_resource());
}

fn record_view(record: &SessionRecord) -> serde_json::Value {
    // The cookie value itself stays private; only its presence is shown.
    json!({
        "project_id": record.project_id,
        "execution_id": record.headers.execution_id,
        "has_cookie": record.headers.cookie.is_some(),
        "captured_at": record.captured_at.to_rfc3339(),
    })
}

// ============================================================================
// sessions://active
// ============================================================================

fn active_sessions_resource() -> RegisteredResource {
    ResourceBuilder::new("sessions://active", "Active Test Sessions")
        .description("Correlation state of every project with a started test run")
        .mime_type("application/json")
        .build(active_sessions_handler)
}

async fn active_sessions_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let records = ctx.sessions.active().await;
    let view = json!({
        "sessions": records.iter().map(record_view).collect::<Vec<_>>(),
        "total": records.len(),
    });

    let content = ResourceContent::Text {
        uri,
        mime_type: Some("application/json".to_string()),
        text: serde_json::to_string_pretty(&view).unwrap_or_default(),
    };

    Ok(vec![content])
}

// ============================================================================
// sessions://{project_id}
// ============================================================================

fn project_session_resource() -> RegisteredResource {
    ResourceBuilder::new("sessions://{project_id}", "Project Test Session")
        .description("Correlation state of one project's test run")
        .mime_type("application/json")
        .build(project_session_handler)
}

async fn project_session_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let project_id = uri
        .strip_prefix("sessions://")
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| McpError::ResourceNotFound(uri.clone()))?;

    let record = ctx
        .sessions
        .get(project_id)
        .await
        .ok_or_else(|| McpError::ResourceNotFound(uri.clone()))?;

    let content = ResourceContent::Text {
        uri,
        mime_type: Some("application/json".to_string()),
        text: serde_json::to_string_pretty(&record_view(&record)).unwrap_or_default(),
    };

    Ok(vec![content])
}
