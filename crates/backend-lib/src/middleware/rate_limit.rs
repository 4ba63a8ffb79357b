// ============================
// crates/backend-lib/src/middleware/rate_limit.rs
// ============================
//! Admission-control middleware for the auth endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::warn;

use crate::error::AppError;
use crate::metrics as keys;
use crate::ratelimit::RateLimiter;

/// Gate a request through the sliding-window limiter before it reaches
/// the handler. Rejections surface as [`AppError::RateLimited`] and are
/// not forwarded.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = client_identity(&request);

    if !limiter.admit(&identity, Instant::now()) {
        counter!(keys::RATELIMIT_REJECTED).increment(1);
        warn!("rate limit exceeded for {identity}");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

/// Client identity: `x-real-ip` when a fronting proxy supplies it,
/// otherwise the socket peer address.
fn client_identity(request: &Request) -> String {
    if let Some(ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|header| header.to_str().ok())
    {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
