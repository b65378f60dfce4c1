//! Project Tools
//!
//! Tools for listing projects and changing their lifecycle status.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};
use crate::openl::ProjectStatus;

use super::tool_error;

/// Register project tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(projects_query_tool());
    registry.register_tool(projects_action_tool());
}

// ============================================================================
// projects.query
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProjectsQueryParams {
    query_type: ProjectsQueryType,
    #[serde(default)]
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProjectsQueryType {
    List,
    Get,
}

fn projects_query_tool() -> RegisteredTool {
    ToolBuilder::new("projects.query")
        .description("Query rules projects: list all projects or get one project with its status")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "query_type": {
                    "type": "string",
                    "enum": ["list", "get"],
                    "description": "Type of query: 'list' for all projects, 'get' for one project"
                },
                "project_id": {
                    "type": "string",
                    "description": "Project identifier (required for 'get')"
                }
            },
            "required": ["query_type"]
        }))
        .category(ToolCategory::Read)
        .build(projects_query_handler)
}

async fn projects_query_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ProjectsQueryParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match params.query_type {
        ProjectsQueryType::List => list_projects(&ctx).await,
        ProjectsQueryType::Get => {
            let project_id = params.project_id.ok_or_else(|| {
                McpError::InvalidParams("project_id required for 'get' query".into())
            })?;
            get_project(&ctx, &project_id).await
        }
    }
}

async fn list_projects(ctx: &ToolContext) -> ToolResult {
    let projects = ctx.gateway.list_projects().await.map_err(tool_error)?;

    let total = projects.len();
    let result = serde_json::json!({
        "projects": projects,
        "total": total,
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn get_project(ctx: &ToolContext, project_id: &str) -> ToolResult {
    let project = ctx.gateway.get_project(project_id).await.map_err(tool_error)?;

    ToolsCallResult::json(&project).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// projects.action
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProjectsActionParams {
    action: ProjectActionType,
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProjectActionType {
    Open,
    Close,
}

fn projects_action_tool() -> RegisteredTool {
    ToolBuilder::new("projects.action")
        .description("Open or close a rules project")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["open", "close"],
                    "description": "Action to perform on the project"
                },
                "project_id": {
                    "type": "string",
                    "description": "Project identifier"
                }
            },
            "required": ["action", "project_id"]
        }))
        .category(ToolCategory::Write)
        .build(projects_action_handler)
}

async fn projects_action_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ProjectsActionParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let status = match params.action {
        ProjectActionType::Open => ProjectStatus::Opened,
        ProjectActionType::Close => ProjectStatus::Closed,
    };

    ctx.gateway
        .set_project_status(&params.project_id, status)
        .await
        .map_err(tool_error)?;

    let result = serde_json::json!({
        "success": true,
        "project_id": params.project_id,
        "status": status.as_str(),
        "message": format!("Project '{}' is now {}", params.project_id, status.as_str()),
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}
