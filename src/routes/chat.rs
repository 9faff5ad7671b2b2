//! Chat completions endpoint
//!
//! Normalizes the caller's request, merges in provider tools and relays it to
//! the backend. Handles both streaming and non-streaming responses.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::info;

use crate::{
    chat::{normalize, IncomingChatRequest},
    error::AppError,
    middleware::auth::AuthToken,
    proxy::{ByteStream, Relayed},
    AppState,
};

/// Handle chat completion requests
///
/// Accepts OpenAI-, Anthropic- and Azure-style requests and answers in the
/// backend's OpenAI-compatible format.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    body: Bytes,
) -> Result<Response, AppError> {
    let incoming: IncomingChatRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

    let mut request = normalize(incoming);
    state.registry.augment(&mut request).await;

    info!(
        model = %request.model,
        stream = %request.stream,
        messages = %request.messages.len(),
        tools = %request.tools.as_ref().map_or(0, Vec::len),
        auth_scheme = %token.scheme(),
        "Processing chat completion request"
    );

    match state.relay.relay(&request).await? {
        Relayed::Stream(stream) => streaming_response(stream),
        Relayed::Json(value) => Ok((StatusCode::OK, Json(value)).into_response()),
    }
}

/// Wrap a relayed byte stream as an SSE response
fn streaming_response(stream: ByteStream) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
