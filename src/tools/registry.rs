//! Capability registry
//!
//! Merges the caller's tools with every provider's tools and decides the
//! final `tool_choice`. Also routes tool execution to the owning provider.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{tool_error, CapabilityProvider, ToolArguments};
use crate::chat::{ChatCompletionRequest, Tool, ToolChoice};

/// Ordered set of capability providers
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    providers: Vec<Arc<dyn CapabilityProvider>>,
}

impl CapabilityRegistry {
    /// Create a registry. Native providers are placed before external hosts;
    /// registration order is kept within each kind.
    pub fn new(mut providers: Vec<Arc<dyn CapabilityProvider>>) -> Self {
        providers.sort_by_key(|p| p.kind());
        Self { providers }
    }

    /// Tools contributed by all providers, in provider order
    pub async fn provider_tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        for provider in &self.providers {
            let contributed = provider.list_tools().await;
            debug!(
                provider = %provider.name(),
                count = contributed.len(),
                "Provider contributed tools"
            );
            tools.extend(contributed);
        }
        tools
    }

    /// Compute the final `tools`/`tool_choice` pair for a canonical request
    pub async fn augment(&self, request: &mut ChatCompletionRequest) {
        if request.tool_choice.as_ref().is_some_and(ToolChoice::is_none) {
            request.tools = None;
            return;
        }

        let mut tools = request.tools.take().unwrap_or_default();
        tools.extend(self.provider_tools().await);

        if tools.is_empty() {
            return;
        }

        if request.tool_choice.is_none() {
            request.tool_choice = Some(ToolChoice::AUTO);
        }
        request.tools = Some(tools);
    }

    /// Execute a tool on the first provider that exposes it
    pub async fn call_tool(&self, name: &str, arguments: ToolArguments) -> String {
        for provider in &self.providers {
            let owns_tool = provider
                .list_tools()
                .await
                .iter()
                .any(|tool| tool.name() == name);

            if owns_tool {
                debug!(provider = %provider.name(), tool = %name, "Dispatching tool call");
                return provider.call_tool(name, arguments).await;
            }
        }

        warn!(tool = %name, "No provider exposes requested tool");
        tool_error(name, "tool not found")
    }
}
