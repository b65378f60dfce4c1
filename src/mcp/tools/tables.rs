//! Table Tools
//!
//! Tools for listing a project's rule tables.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};
use crate::openl::TableQuery;

use super::tool_error;

/// Register table tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(tables_list_tool());
}

// ============================================================================
// tables.list
// ============================================================================

#[derive(Debug, Deserialize)]
struct TablesListParams {
    project_id: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn tables_list_tool() -> RegisteredTool {
    ToolBuilder::new("tables.list")
        .description(
            "List a project's rule tables, optionally filtered by table kind or a name \
             substring",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "string",
                    "description": "Project identifier"
                },
                "kind": {
                    "type": "string",
                    "description": "Filter by table kind (e.g. 'Rules', 'Test')"
                },
                "name": {
                    "type": "string",
                    "description": "Filter by a name substring"
                }
            },
            "required": ["project_id"]
        }))
        .category(ToolCategory::Read)
        .build(tables_list_handler)
}

async fn tables_list_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TablesListParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let query = TableQuery {
        kind: params.kind,
        name: params.name,
    };
    let tables = ctx
        .gateway
        .list_tables(&params.project_id, &query)
        .await
        .map_err(tool_error)?;

    let total = tables.len();
    let result = serde_json::json!({
        "project_id": params.project_id,
        "tables": tables,
        "total": total,
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}
