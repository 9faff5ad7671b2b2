//! Request normalization
//!
//! Rewrites an incoming request into the canonical form. Steps run in a
//! fixed order: system folding, then token-limit aliasing.

use super::request::{ChatCompletionRequest, IncomingChatRequest};
use super::types::Message;

/// Convert an incoming request into the canonical request
pub fn normalize(request: IncomingChatRequest) -> ChatCompletionRequest {
    let IncomingChatRequest {
        model,
        mut messages,
        stream,
        temperature,
        top_p,
        max_completion_tokens,
        max_tokens,
        stop,
        seed,
        logit_bias,
        tools,
        tool_choice,
        thinking,
        response_format,
        system,
    } = request;

    fold_system(&mut messages, system);

    ChatCompletionRequest {
        model,
        messages,
        stream,
        temperature,
        top_p,
        max_completion_tokens: max_completion_tokens.or(max_tokens),
        stop,
        seed,
        logit_bias,
        tools,
        tool_choice,
        thinking,
        response_format,
    }
}

/// Prepend a top-level system prompt as the first message.
///
/// Existing system messages are left alone, so a request carrying both ends
/// up with two.
fn fold_system(messages: &mut Vec<Message>, system: Option<String>) {
    if let Some(system) = system {
        messages.insert(0, Message::system(system));
    }
}
