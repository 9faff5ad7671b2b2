//! MIAA Gateway - unified inference gateway
//!
//! Accepts chat completions in OpenAI, Anthropic or Azure conventions,
//! normalizes them, augments them with tools from capability providers, and
//! relays them to a single backend inference engine.

pub mod chat;
pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod tools;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use crate::config::Config;
pub use crate::proxy::InferenceRelay;
pub use crate::tools::{CapabilityProvider, CapabilityRegistry, ToolHostSession};

use crate::tools::{DuckDuckGoSearch, HostStatus, SessionState, WebSearchTool};

/// State of the optional external capability provider, as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityProviderStatus {
    Disabled,
    Connected,
    Error,
}

/// Upper bound on establishing a backend connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One pooled client for the whole process.
///
/// `UPSTREAM_TIMEOUT_SECS` bounds each read, not the whole exchange, so a
/// long stream stays open as long as chunks keep arriving.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(100)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Gateway context shared by every request handler.
///
/// Built once at startup and torn down once by [`AppState::shutdown`].
pub struct AppState {
    pub config: Config,
    /// Backend client
    pub relay: InferenceRelay,
    /// Providers that contribute tools to requests
    pub registry: CapabilityRegistry,
    /// External tool host, kept even when it failed so health can report it
    pub tool_host: Option<Arc<ToolHostSession>>,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: Config) -> Result<Self> {
        let http_client = build_http_client(&config)?;
        let relay = InferenceRelay::new(http_client.clone(), &config)?;

        let mut providers: Vec<Arc<dyn CapabilityProvider>> = Vec::new();

        if config.web_search_enabled {
            let backend = DuckDuckGoSearch::new(http_client.clone(), config.web_search_url.clone());
            providers.push(Arc::new(WebSearchTool::new(Arc::new(backend))));
            info!("Native web_search tool enabled");
        }

        let tool_host = match &config.tool_host {
            Some(host_config) => {
                let session = Arc::new(ToolHostSession::new(host_config.clone()));
                match session.connect().await {
                    SessionState::Ready => providers.push(session.clone()),
                    state => warn!(state = ?state, "Tool host unavailable; serving without it"),
                }
                Some(session)
            }
            None => None,
        };

        Ok(Self {
            config,
            relay,
            registry: CapabilityRegistry::new(providers),
            tool_host,
        })
    }

    /// Create an application state with caller-supplied providers
    ///
    /// Nothing is spawned; `tool_host` is only used for health reporting and
    /// shutdown.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        config: Config,
        providers: Vec<Arc<dyn CapabilityProvider>>,
        tool_host: Option<Arc<ToolHostSession>>,
    ) -> Result<Self> {
        let relay = InferenceRelay::new(build_http_client(&config)?, &config)?;

        Ok(Self {
            config,
            relay,
            registry: CapabilityRegistry::new(providers),
            tool_host,
        })
    }

    pub async fn capability_provider_status(&self) -> CapabilityProviderStatus {
        match &self.tool_host {
            None => CapabilityProviderStatus::Disabled,
            Some(session) => match session.status().await {
                HostStatus::Connected => CapabilityProviderStatus::Connected,
                HostStatus::Error => CapabilityProviderStatus::Error,
            },
        }
    }

    /// Release process-wide resources
    pub async fn shutdown(&self) {
        if let Some(session) = &self.tool_host {
            session.disconnect().await;
        }
    }
}
