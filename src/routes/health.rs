//! Health check endpoint
//!
//! `/health` is public and never touches the backend. It reports whether the
//! optional external tool host is in use and whether it is usable.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{AppState, CapabilityProviderStatus};

/// Name of this layer in a multi-layer deployment
pub const LAYER: &str = "middleware";

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub layer: &'static str,
    pub capability_provider: CapabilityProviderStatus,
}

/// Health check endpoint
///
/// Always 200: a failed tool host degrades tool augmentation, not the gateway.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        layer: LAYER,
        capability_provider: state.capability_provider_status().await,
    };

    (StatusCode::OK, Json(response))
}
