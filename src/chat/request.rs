//! Request types for chat completions
//!
//! `IncomingChatRequest` is what callers send, in any supported convention.
//! `ChatCompletionRequest` is the canonical form forwarded to the backend.
//! Fields outside the schema are dropped on decode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Message, ResponseFormat, StopSequence, ThinkingConfig, Tool, ToolChoice};

/// Chat completion request as received from a caller
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IncomingChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub stream: bool,

    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_completion_tokens: Option<u32>,
    /// Older name for `max_completion_tokens`
    pub max_tokens: Option<u32>,
    pub stop: Option<StopSequence>,
    pub seed: Option<i64>,
    pub logit_bias: Option<HashMap<String, f64>>,

    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
    pub thinking: Option<ThinkingConfig>,
    pub response_format: Option<ResponseFormat>,

    /// Anthropic-style top-level system prompt
    pub system: Option<String>,
}

/// Canonical chat completion request
///
/// There is no `system` or `max_tokens` field: both are folded in during
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}
