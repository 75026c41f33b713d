//! Access gate middleware for the `/api` routes.

use super::ApiError;
use crate::access::AccessGate;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Runs the access gate before the wrapped handler.
///
/// Pre-flight `OPTIONS` requests are never gated.
pub async fn require_api_key(
    State(gate): State<Arc<AccessGate>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    match gate.evaluate(presented) {
        Ok(()) => next.run(request).await,
        Err(denial) => ApiError::from(denial).into_response(),
    }
}
