//! Inference relay
//!
//! Forwards canonical requests to the backend inference engine and hands the
//! result back either as a live byte stream or as one parsed JSON body.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header::HeaderMap, StatusCode};
use serde_json::Value;

use super::headers::build_default_headers;
use super::logging::RequestContext;
use crate::chat::ChatCompletionRequest;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Stream type for relayed backend bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

pub const UNREACHABLE_MESSAGE: &str =
    "Inference Engine unavailable (Isolation Layer unreachable)";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Upper bound on error-body bytes kept for diagnostics
const ERROR_BODY_LIMIT: usize = 2048;
/// Error bodies that take longer than this are not waited for
const ERROR_BODY_TIMEOUT: Duration = Duration::from_secs(2);

/// What the backend produced
pub enum Relayed {
    /// SSE bytes, passed through chunk by chunk
    Stream(ByteStream),
    /// Whole completion body
    Json(Value),
}

/// Client for the single backend inference engine
pub struct InferenceRelay {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl InferenceRelay {
    /// Create a relay using the shared HTTP client and the gateway's own backend key
    pub fn new(client: reqwest::Client, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            base_url: config.inference_url.clone(),
            headers: build_default_headers(&config.upstream_key)?,
        })
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH)
    }

    /// Forward a canonical request. No retries are attempted.
    pub async fn relay(&self, request: &ChatCompletionRequest) -> AppResult<Relayed> {
        let ctx = RequestContext::new(CHAT_COMPLETIONS_PATH)
            .with_model(request.model.as_str())
            .with_streaming(request.stream);

        let response = self.send(&ctx, request).await?;

        if request.stream {
            return Ok(Relayed::Stream(relay_stream(ctx, response)));
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        ctx.log_request_complete(body.len());
        Ok(Relayed::Json(value))
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        request: &ChatCompletionRequest,
    ) -> AppResult<reqwest::Response> {
        let url = self.chat_completions_url();
        ctx.log_upstream_request(&url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ctx.log_connection_error(&e.to_string(), &url);
                    AppError::ServiceUnavailable(UNREACHABLE_MESSAGE.to_string())
                } else {
                    AppError::HttpError(e)
                }
            })?;

        let status = response.status();
        ctx.log_upstream_response(status.as_u16());

        if status != StatusCode::OK {
            let detail = capture_error_body(response).await;
            ctx.log_upstream_error(status.as_u16(), &detail);
            return Err(AppError::UpstreamError {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

/// Best-effort, bounded read of an error body
async fn capture_error_body(response: reqwest::Response) -> String {
    let text = match tokio::time::timeout(ERROR_BODY_TIMEOUT, response.bytes()).await {
        Ok(Ok(body)) => String::from_utf8_lossy(&body).trim().to_string(),
        _ => String::new(),
    };

    if text.is_empty() {
        "Upstream error".to_string()
    } else {
        text.chars().take(ERROR_BODY_LIMIT).collect()
    }
}

/// Pass upstream chunks through untouched.
///
/// The upstream body is only polled when the consumer asks for the next
/// chunk, so a slow client slows the read side. Dropping the stream drops
/// the upstream response and frees its connection.
fn relay_stream(ctx: RequestContext, response: reqwest::Response) -> ByteStream {
    let mut upstream = Box::pin(response.bytes_stream());

    Box::pin(async_stream::stream! {
        let mut chunks = 0usize;
        let mut bytes = 0usize;

        while let Some(item) = upstream.next().await {
            match &item {
                Ok(chunk) => {
                    chunks += 1;
                    bytes += chunk.len();
                }
                Err(e) => ctx.log_stream_error(&e.to_string()),
            }
            yield item;
        }

        ctx.log_stream_complete(chunks, bytes);
    })
}
