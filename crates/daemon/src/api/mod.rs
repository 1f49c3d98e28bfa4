// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP control plane.
//!
//! Bearer-authenticated endpoints under `/srv`, plus an unauthenticated
//! `/health`. Handlers are thin: authenticate, validate, forward to the
//! caches, map errors to status codes.

mod footprint;
mod logs;
mod resources;
mod services;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tracing::warn;

use oz_core::Clock;

use crate::provisioner::Provisioner;

/// Shared context for all request handlers.
pub struct ApiCtx<C: Clock> {
    pub provisioner: Arc<Provisioner<C>>,
    /// Value of `OZWALD_SYSTEM_KEY`; every `/srv` request must carry it.
    pub system_key: String,
}

/// Handler failures, mapped onto control-plane status codes.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Conflict(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(serde_json::json!({ "detail": "Invalid authentication credentials" })),
            )
                .into_response(),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::Conflict(detail) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::ServiceUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
        }
    }
}

/// Bearer-token gate for the `/srv` routes.
async fn require_bearer<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = format!("Bearer {}", ctx.system_key);
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if provided != Some(expected.as_str()) {
        warn!("unauthorized access attempt: invalid or missing bearer token");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Build the control-plane router.
pub fn router<C: Clock + 'static>(ctx: Arc<ApiCtx<C>>) -> Router {
    let authed = Router::new()
        .route("/srv/services/configured/", get(services::configured::<C>))
        .route("/srv/services/active/", get(services::active::<C>))
        .route("/srv/services/dynamic/update/", post(services::update::<C>))
        // Legacy update paths, kept for older clients
        .route("/srv/services/active/update/", post(services::update::<C>))
        .route("/srv/services/update/", post(services::update::<C>))
        .route("/srv/resources/available/", get(resources::available::<C>))
        .route("/srv/host/resources", get(resources::host_resources::<C>))
        .route(
            "/srv/services/footprint",
            get(footprint::list::<C>).post(footprint::request::<C>),
        )
        .route("/srv/services/logs/{service}/", get(logs::service_logs::<C>))
        .route("/srv/services/launch-logs/{service}/", get(logs::service_logs::<C>))
        .layer(middleware::from_fn_with_state(ctx.clone(), require_bearer::<C>));

    Router::new().route("/health", get(health)).merge(authed).with_state(ctx)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
