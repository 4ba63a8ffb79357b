// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router and handlers for the auth endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use authgate_common::{LoginRequest, LoginResponse, RegisterRequest};

use crate::auth::token::{self, TokenClaims};
use crate::error::AppError;
use crate::middleware::rate_limit;
use crate::validation;
use crate::AppState;

/// Build the application router.
///
/// The register/login endpoints sit behind the admission-control
/// middleware; `/api/me` and `/health` are not budgeted.
pub fn create_router(state: Arc<AppState>) -> Router {
    let gated = Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route_layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit));

    Router::new()
        .merge(gated)
        .route("/api/me", get(me_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_register(&req)?;
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validation::validate_login(&req)?;
    let response = state.auth.login(req).await?;
    Ok(Json(response))
}

/// Echo the verified claims of the presented bearer token.
async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenClaims>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let claims = token::verify(token, &state.settings.auth.jwt_secret)
        .map_err(|_| AppError::Unauthorized)?;
    Ok(Json(claims))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
