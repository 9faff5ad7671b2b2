//! Native, in-process tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{tool_error, CapabilityProvider, ProviderKind, SearchBackend, ToolArguments};
use crate::chat::Tool;

pub const WEB_SEARCH: &str = "web_search";

const DEFAULT_MAX_RESULTS: usize = 5;

/// `web_search` tool backed by a [`SearchBackend`]
pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub fn definition() -> Tool {
        Tool::function(
            WEB_SEARCH,
            Some("Search the internet for current information using DuckDuckGo.".to_string()),
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query."
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results to return (default 5).",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn search(&self, arguments: &ToolArguments) -> String {
        let Some(query) = arguments.get("query").and_then(Value::as_str) else {
            return tool_error(WEB_SEARCH, "missing required argument 'query'");
        };
        let max_results = arguments
            .get("max_results")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_RESULTS, |n| n as usize);

        info!(query = %query, max_results, "Running web search");

        match self.backend.search(query, max_results).await {
            Ok(hits) if hits.is_empty() => "No results found.".to_string(),
            Ok(hits) => hits
                .iter()
                .enumerate()
                .map(|(i, hit)| {
                    format!("{}. {}\n   {}\n   {}\n\n", i + 1, hit.title, hit.href, hit.body)
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Web search failed");
                format!("Error performing search: {:#}", e)
            }
        }
    }
}

#[async_trait]
impl CapabilityProvider for WebSearchTool {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Native
    }

    fn name(&self) -> &str {
        WEB_SEARCH
    }

    async fn list_tools(&self) -> Vec<Tool> {
        vec![Self::definition()]
    }

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> String {
        match name {
            WEB_SEARCH => self.search(&arguments).await,
            other => tool_error(other, "unknown native tool"),
        }
    }
}
