//! Authentication middleware
//!
//! Accepts the three credential conventions clients use in the wild:
//! OpenAI (`Authorization: Bearer`), Anthropic (`x-api-key`) and Azure
//! (`api-key`). Only presence is enforced; the token is not checked against
//! a credential store.

use std::fmt;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::error::AppError;

pub const X_API_KEY: &str = "x-api-key";
pub const API_KEY: &str = "api-key";

pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Missing authentication. Provide 'Authorization: Bearer <key>', 'x-api-key', or 'api-key'.";

/// Which convention carried the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    XApiKey,
    ApiKey,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::XApiKey => write!(f, "x-api-key"),
            AuthScheme::ApiKey => write!(f, "api-key"),
        }
    }
}

/// Opaque caller credential, stored in request extensions
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    scheme: AuthScheme,
}

impl AuthToken {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Credential candidates found on a request, before precedence is applied
#[derive(Debug, Default, Clone)]
pub struct Credentials<'a> {
    pub bearer: Option<&'a str>,
    pub x_api_key: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    /// Collect the candidates from request headers
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        Self {
            bearer: header_str(headers, header::AUTHORIZATION.as_str())
                .and_then(extract_bearer_token),
            x_api_key: header_str(headers, X_API_KEY),
            api_key: header_str(headers, API_KEY),
        }
    }

    /// Pick one token using the fixed precedence bearer > x-api-key > api-key
    pub fn resolve(&self) -> Result<AuthToken, AppError> {
        let (value, scheme) = if let Some(v) = present(self.bearer) {
            (v, AuthScheme::Bearer)
        } else if let Some(v) = present(self.x_api_key) {
            (v, AuthScheme::XApiKey)
        } else if let Some(v) = present(self.api_key) {
            (v, AuthScheme::ApiKey)
        } else {
            return Err(AppError::Unauthenticated(
                MISSING_CREDENTIALS_MESSAGE.to_string(),
            ));
        };

        Ok(AuthToken {
            value: value.to_string(),
            scheme,
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Extract the credentials from an `Authorization: Bearer <token>` value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, rest) = auth_header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim())
    } else {
        None
    }
}

/// Authentication middleware
///
/// Resolves the caller's token and adds it to request extensions. Requests
/// without any of the accepted credentials are rejected with 401.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let token = match Credentials::from_headers(request.headers()).resolve() {
        Ok(token) => token,
        Err(e) => {
            warn!("Request rejected: no credentials");
            return Err(e);
        }
    };

    debug!(scheme = %token.scheme(), "Caller authenticated");

    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}
