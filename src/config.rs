//! Configuration management for the gateway
//!
//! Configuration is loaded from environment variables once at startup.
//! There is no hot-reload.

use anyhow::{bail, Context, Result};
use std::env;

/// Launch parameters for the external tool host process
#[derive(Debug, Clone, PartialEq)]
pub struct ToolHostConfig {
    /// Executable to spawn
    pub command: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    pub env: Vec<(String, String)>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Base URL of the backend inference engine (OpenAI-compatible, ends in `/v1`)
    pub inference_url: String,
    /// Credential the gateway presents to the backend
    pub upstream_key: String,
    /// Per-request timeout for backend calls (in seconds)
    pub upstream_timeout_secs: u64,

    /// External tool host, if one is configured
    pub tool_host: Option<ToolHostConfig>,

    /// Expose the native `web_search` tool
    pub web_search_enabled: bool,
    /// Base URL of the search API backing `web_search`
    pub web_search_url: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let tool_host = match env::var("TOOL_HOST_COMMAND") {
            Ok(command) if !command.trim().is_empty() => Some(ToolHostConfig {
                command: command.trim().to_string(),
                args: env::var("TOOL_HOST_ARGS")
                    .map(|v| v.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
                env: match env::var("TOOL_HOST_ENV") {
                    Ok(raw) => parse_env_pairs(&raw).context("Invalid TOOL_HOST_ENV")?,
                    Err(_) => Vec::new(),
                },
            }),
            _ => None,
        };

        Ok(Self {
            host: env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("GATEWAY_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid GATEWAY_PORT")?,

            inference_url: env::var("INFERENCE_URL")
                .unwrap_or_else(|_| "http://inference:8000/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            upstream_key: env::var("UPSTREAM_KEY").unwrap_or_else(|_| "EMPTY".to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("Invalid UPSTREAM_TIMEOUT_SECS")?,

            tool_host,

            web_search_enabled: env::var("WEB_SEARCH_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            web_search_url: env::var("WEB_SEARCH_URL")
                .unwrap_or_else(|_| "https://api.duckduckgo.com".to_string())
                .trim_end_matches('/')
                .to_string(),

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }
}

/// Parse `KEY=VALUE` pairs separated by commas
pub fn parse_env_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("expected KEY=VALUE, got '{}'", entry);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty variable name in '{}'", entry);
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }
    Ok(pairs)
}
