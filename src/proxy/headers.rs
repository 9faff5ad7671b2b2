//! Header utilities for backend requests
//!
//! The gateway authenticates to the backend with its own credential. Client
//! headers are never copied onto backend requests.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Build the fixed header set sent with every backend request
pub fn build_default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .context("UPSTREAM_KEY is not a valid header value")?;
    auth.set_sensitive(true);

    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}
