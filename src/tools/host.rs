//! External tool host session
//!
//! Manages one MCP server running as a child process and talking JSON-RPC
//! over its stdio. Lifecycle:
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Ready --disconnect()--> Disconnected
//!                                        \--err--> Failed
//! Ready --host process exits--> Failed
//! ```
//!
//! # Concurrency
//!
//! Requests share one channel. Every JSON-RPC request carries its own id and
//! rmcp's `Peer` routes each response back to its caller by that id, so many
//! calls may be in flight at once. The state lock is only held long enough to
//! clone the peer handle; it never spans a round trip.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, RawContent};
use rmcp::service::{Peer, RoleClient, RunningService, ServiceExt as _};
use rmcp::transport::TokioChildProcess;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{tool_error, CapabilityProvider, ProviderKind, ToolArguments};
use crate::chat::Tool;
use crate::config::ToolHostConfig;

type HostService = RunningService<RoleClient, ()>;

const HOST_EXITED: &str = "tool host process exited";

/// Observable lifecycle state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
    Failed(String),
}

/// Health view of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Connected,
    Error,
}

enum Inner {
    Disconnected,
    Connecting,
    Ready(HostService),
    Failed(String),
}

impl Inner {
    fn state(&self) -> SessionState {
        match self {
            Inner::Disconnected => SessionState::Disconnected,
            Inner::Connecting => SessionState::Connecting,
            Inner::Ready(service) if service.is_transport_closed() => {
                SessionState::Failed(HOST_EXITED.to_string())
            }
            Inner::Ready(_) => SessionState::Ready,
            Inner::Failed(reason) => SessionState::Failed(reason.clone()),
        }
    }
}

/// Session with one external tool host process
pub struct ToolHostSession {
    config: ToolHostConfig,
    inner: RwLock<Inner>,
}

impl fmt::Debug for ToolHostSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHostSession")
            .field("command", &self.config.command)
            .field("args", &self.config.args)
            .finish_non_exhaustive()
    }
}

impl ToolHostSession {
    pub fn new(config: ToolHostConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner::Disconnected),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state()
    }

    /// `Connected` only while the channel to the host is still open
    pub async fn status(&self) -> HostStatus {
        match self.inner.read().await.state() {
            SessionState::Ready => HostStatus::Connected,
            _ => HostStatus::Error,
        }
    }

    /// Spawn the host process and run the MCP initialize handshake.
    ///
    /// Any failure leaves the session `Failed`. The child process is owned by
    /// the transport, so a failed handshake drops and kills it.
    pub async fn connect(&self) -> SessionState {
        let mut inner = self.inner.write().await;
        if inner.state() == SessionState::Ready {
            return SessionState::Ready;
        }
        *inner = Inner::Connecting;

        info!(command = %self.config.command, "Connecting to tool host");

        *inner = match self.spawn_and_initialize().await {
            Ok(service) => {
                info!(command = %self.config.command, "Tool host connected and initialized");
                Inner::Ready(service)
            }
            Err(reason) => {
                error!(command = %self.config.command, error = %reason, "Failed to connect to tool host");
                Inner::Failed(reason)
            }
        };

        inner.state()
    }

    async fn spawn_and_initialize(&self) -> Result<HostService, String> {
        let mut cmd = tokio::process::Command::new(&self.config.command);
        cmd.args(&self.config.args);
        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }

        let transport =
            TokioChildProcess::new(cmd).map_err(|e| format!("failed to spawn process: {e}"))?;

        ().serve(transport)
            .await
            .map_err(|e| format!("initialize handshake failed: {e}"))
    }

    /// Release the channel and stop the process. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let previous = std::mem::replace(&mut *self.inner.write().await, Inner::Disconnected);

        if let Inner::Ready(service) = previous {
            match service.cancel().await {
                Ok(reason) => info!(reason = ?reason, "Tool host disconnected"),
                Err(e) => warn!(error = %e, "Tool host did not shut down cleanly"),
            }
        }
    }

    async fn peer(&self) -> Option<Peer<RoleClient>> {
        match &*self.inner.read().await {
            Inner::Ready(service) if !service.is_transport_closed() => {
                Some(service.peer().clone())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl CapabilityProvider for ToolHostSession {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ExternalHost
    }

    fn name(&self) -> &str {
        &self.config.command
    }

    /// Queries the host on every call; nothing is cached.
    async fn list_tools(&self) -> Vec<Tool> {
        let Some(peer) = self.peer().await else {
            return Vec::new();
        };

        match peer.list_all_tools().await {
            Ok(tools) => tools
                .into_iter()
                .map(|tool| {
                    Tool::function(
                        tool.name.into_owned(),
                        Some(tool.description.as_deref().unwrap_or("").to_string()),
                        Value::Object((*tool.input_schema).clone()),
                    )
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list tools from tool host");
                Vec::new()
            }
        }
    }

    /// Only text segments of the result are kept.
    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> String {
        let Some(peer) = self.peer().await else {
            return tool_error(name, "tool host session is not active");
        };

        let result = match peer
            .call_tool(CallToolRequestParam {
                name: Cow::Owned(name.to_string()),
                arguments: Some(arguments),
            })
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                return tool_error(name, e);
            }
        };

        let text: String = result
            .content
            .into_iter()
            .filter_map(|content| match content.raw {
                RawContent::Text(segment) => Some(segment.text),
                _ => None,
            })
            .collect();

        if result.is_error.unwrap_or(false) {
            warn!(tool = %name, "Tool reported an error");
            return tool_error(name, text);
        }

        text
    }
}
