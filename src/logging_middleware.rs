// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::{debug, enabled, Level};

use crate::common::generate_request_id;
use crate::common::helpers::mask_emails_in_json;

/// Bodies above this size are passed through without being logged
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Renders a body for the log with every email masked
fn render_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() || bytes.len() > MAX_LOGGED_BODY {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(mut json) => {
            mask_emails_in_json(&mut json);
            Some(serde_json::to_string(&json).unwrap_or_default())
        }
        Err(_) => Some(body_str.to_string()),
    }
}

/// Logs request and response bodies at debug level, tagged with a request id
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request_id = generate_request_id();
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = render_body(&bytes) {
        debug!(
            request_id = %request_id,
            method = %parts.method,
            uri = %parts.uri,
            request_body = %body,
            "Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = render_body(&bytes) {
        debug!(
            request_id = %request_id,
            status = %parts.status,
            response_body = %body,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
