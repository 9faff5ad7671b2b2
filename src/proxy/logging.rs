//! Request logging for backend relaying
//!
//! Structured logs with a short correlation ID so one relayed request can be
//! followed from dispatch to the end of its stream.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Context for tracking one relayed request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    pub start_time: Instant,
    /// Backend endpoint being called
    pub endpoint: String,
    pub model: Option<String>,
    pub streaming: bool,
}

impl RequestContext {
    pub fn new(endpoint: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(),
            start_time: Instant::now(),
            endpoint: endpoint.to_string(),
            model: None,
            streaming: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    pub fn log_upstream_request(&self, url: &str) {
        debug!(
            trace_id = %self.trace_id,
            url = %url,
            model = ?self.model,
            streaming = %self.streaming,
            "Sending request to inference backend"
        );
    }

    pub fn log_upstream_response(&self, status: u16) {
        info!(
            trace_id = %self.trace_id,
            endpoint = %self.endpoint,
            status = %status,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from inference backend"
        );
    }

    /// Backend answered, but not with 200
    pub fn log_upstream_error(&self, status: u16, detail: &str) {
        warn!(
            trace_id = %self.trace_id,
            endpoint = %self.endpoint,
            status = %status,
            detail = %detail,
            elapsed_ms = %self.elapsed_ms(),
            "Inference backend returned an error"
        );
    }

    /// Backend could not be reached at all
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to inference backend failed"
        );
    }

    pub fn log_request_complete(&self, body_bytes: usize) {
        info!(
            trace_id = %self.trace_id,
            model = ?self.model,
            body_bytes = %body_bytes,
            elapsed_ms = %self.elapsed_ms(),
            "Completion relayed"
        );
    }

    pub fn log_stream_error(&self, error: &str) {
        warn!(
            trace_id = %self.trace_id,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Upstream stream error"
        );
    }

    pub fn log_stream_complete(&self, chunks: usize, bytes: usize) {
        info!(
            trace_id = %self.trace_id,
            model = ?self.model,
            chunks = %chunks,
            bytes = %bytes,
            elapsed_ms = %self.elapsed_ms(),
            "Stream relayed"
        );
    }
}
