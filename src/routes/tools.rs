//! Tool endpoints
//!
//! Lists provider-contributed tools and executes a single tool call on behalf
//! of the caller. Execution failures are reported in `content`, so the status
//! is always 200 once the body parses.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{chat::Tool, tools::ToolArguments, AppState};

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<Tool>,
}

/// A single tool invocation
#[derive(Debug, Deserialize)]
pub struct ToolExecutionRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolExecutionResponse {
    pub name: String,
    pub content: String,
}

/// List tools currently offered by the capability providers
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.registry.provider_tools().await,
    })
}

/// Execute a tool by name
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToolExecutionRequest>,
) -> (StatusCode, Json<ToolExecutionResponse>) {
    info!(tool = %request.name, "Executing tool");

    let content = state
        .registry
        .call_tool(&request.name, request.arguments)
        .await;

    (
        StatusCode::OK,
        Json(ToolExecutionResponse {
            name: request.name,
            content,
        }),
    )
}
