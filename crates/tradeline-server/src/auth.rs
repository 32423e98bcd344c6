//! Simple API Key Authentication for the debug routes
//!
//! Accepts either `Authorization: Bearer <key>` or `x-api-key: <key>`.

use std::sync::OnceLock;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Debug-route key, set once from `TRADELINE_API_KEY`
static API_KEY: OnceLock<String> = OnceLock::new();

pub fn init_api_key(key: String) {
    let _ = API_KEY.set(key);
}

fn configured_key() -> Option<&'static str> {
    API_KEY.get().map(|s| s.as_str()).filter(|key| !key.is_empty())
}

/// Credential as presented by the client
#[derive(Debug, PartialEq, Eq)]
enum Presented<'a> {
    ApiKey(&'a str),
    Bearer(&'a str),
    Malformed,
    Missing,
}

impl<'a> Presented<'a> {
    fn from_headers(headers: &'a HeaderMap) -> Self {
        if let Some(key) = headers.get("x-api-key").and_then(|h| h.to_str().ok()) {
            return Self::ApiKey(key);
        }
        match headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        {
            Some(value) => value
                .strip_prefix("Bearer ")
                .map(Self::Bearer)
                .unwrap_or(Self::Malformed),
            None => Self::Missing,
        }
    }
}

/// Guards the call listing routes; a no-op when no key is configured
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    if let Some(api_key) = configured_key() {
        check_credentials(request.headers(), api_key)?;
    }
    Ok(next.run(request).await)
}

fn check_credentials(headers: &HeaderMap, api_key: &str) -> Result<(), StatusCode> {
    match Presented::from_headers(headers) {
        Presented::ApiKey(key) | Presented::Bearer(key) if key == api_key => Ok(()),
        Presented::ApiKey(_) | Presented::Bearer(_) => {
            tracing::warn!("Rejected debug request with a wrong API key");
            Err(StatusCode::UNAUTHORIZED)
        }
        Presented::Malformed => {
            tracing::warn!("Rejected debug request with a non-Bearer Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
        Presented::Missing => Err(StatusCode::UNAUTHORIZED),
    }
}
