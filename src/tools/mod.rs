//! Capability providers
//!
//! A capability provider is a source of callable tools: either native,
//! in-process tools, or an external tool host speaking MCP over stdio.
//! Providers never fail outward. Enumeration problems yield an empty list
//! and execution problems yield a descriptive string.

pub mod host;
pub mod native;
pub mod registry;
pub mod search;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::chat::Tool;

pub use host::{HostStatus, SessionState, ToolHostSession};
pub use native::WebSearchTool;
pub use registry::CapabilityRegistry;
pub use search::{DuckDuckGoSearch, SearchBackend, SearchHit};

/// Arguments to a tool call
pub type ToolArguments = Map<String, Value>;

/// Where a provider's tools come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProviderKind {
    Native,
    ExternalHost,
}

/// Anything that can enumerate tools and execute a named tool call
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Short name for logs
    fn name(&self) -> &str;

    /// Currently available tools; empty when the provider is unavailable
    async fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool. Failures are returned as text, never as an error.
    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> String;
}

/// Standard text for a failed tool execution
pub fn tool_error(name: &str, detail: impl std::fmt::Display) -> String {
    format!("Error executing tool {}: {}", name, detail)
}
