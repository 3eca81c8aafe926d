use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Static bearer-token check in front of the resource routes.
///
/// Only installed when `API_TOKEN` is configured.
pub async fn require_bearer(
    State(expected): State<Arc<str>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(|msg| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthorized("Unauthorized request")
    })?;

    if token != expected.as_ref() {
        tracing::warn!("Rejected {} {}: token mismatch", request.method(), request.uri().path());
        return Err(ApiError::unauthorized("Unauthorized request"));
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_tokens() {
        assert_eq!(extract_bearer(&headers("Bearer abc123")), Ok("abc123"));
        assert_eq!(extract_bearer(&headers("Bearer   ")), Err("Empty bearer token"));
        assert!(extract_bearer(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert_eq!(extract_bearer(&HeaderMap::new()), Err("Missing Authorization header"));
    }
}
